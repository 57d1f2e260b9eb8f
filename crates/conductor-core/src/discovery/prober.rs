//! Discovery Prober: fetches discovery documents and fills the agent store.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tokio::task::JoinSet;

use crate::config::{ConductorConfig, KnownEndpoint};
use crate::discovery::card::DiscoveryDocument;
use crate::error::ServerError;
use crate::events::ProgressLog;
use crate::models::agent::{AgentRecord, Availability};
use crate::models::event::EventKind;
use crate::store::AgentStore;

/// Result of one discovery pass over the configured candidates.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryReport {
    pub discovered: Vec<String>,
    pub failed: Vec<FailedProbe>,
    pub total_agents: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedProbe {
    pub id: String,
    pub error: String,
}

#[derive(Clone)]
pub struct DiscoveryProber {
    store: AgentStore,
    log: ProgressLog,
    http: reqwest::Client,
    candidates: Vec<KnownEndpoint>,
    timeout: Duration,
}

impl DiscoveryProber {
    pub fn new(
        store: AgentStore,
        log: ProgressLog,
        http: reqwest::Client,
        config: &ConductorConfig,
    ) -> Self {
        Self {
            store,
            log,
            http,
            candidates: config.agents.clone(),
            timeout: config.discovery_timeout(),
        }
    }

    pub fn candidates(&self) -> &[KnownEndpoint] {
        &self.candidates
    }

    /// GET and validate a discovery document.
    pub async fn fetch(&self, card_url: &str) -> Result<DiscoveryDocument, ServerError> {
        let response = self
            .http
            .get(card_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ServerError::AgentUnreachable(format!("{}: {}", card_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServerError::AgentUnreachable(format!(
                "{}: HTTP {}",
                card_url, status
            )));
        }

        let raw: serde_json::Value = response.json().await.map_err(|e| {
            ServerError::DiscoveryValidationFailed(format!("{}: invalid JSON: {}", card_url, e))
        })?;
        DiscoveryDocument::parse(raw)
    }

    /// Probe one statically configured endpoint and upsert it on success.
    ///
    /// A failed probe only records an `agent_error` event; any existing
    /// record for the id is left as it was.
    pub async fn probe(&self, endpoint: &KnownEndpoint) -> Result<AgentRecord, ServerError> {
        match self.fetch(&endpoint.card_url).await {
            Ok(doc) => {
                let record = build_record(&endpoint.id, &endpoint.name, &endpoint.card_url, doc);
                self.store.upsert(record.clone()).await;
                tracing::info!("[Discovery] Discovered {} ({})", record.name, record.id);
                self.log
                    .record_discovery(
                        EventKind::AgentDiscovered,
                        format!("Discovered {}", record.name),
                        Some(json!({
                            "id": record.id,
                            "cardUrl": record.card_url,
                            "capabilities": record.capabilities,
                        })),
                    )
                    .await;
                Ok(record)
            }
            Err(e) => {
                tracing::warn!("[Discovery] Failed to discover {}: {}", endpoint.name, e);
                self.log
                    .record_discovery(
                        EventKind::AgentError,
                        format!("Failed to discover {}: {}", endpoint.name, e),
                        Some(json!({ "id": endpoint.id, "cardUrl": endpoint.card_url })),
                    )
                    .await;
                Err(e)
            }
        }
    }

    /// Probe every configured candidate concurrently.
    ///
    /// Re-running against the same reachable endpoints leaves the registry
    /// unchanged: records are keyed by the configured id.
    pub async fn discover_all(&self) -> DiscoveryReport {
        self.log
            .record_discovery(
                EventKind::DiscoveryStart,
                "Starting agent discovery process",
                None,
            )
            .await;

        let mut probes = JoinSet::new();
        for (index, endpoint) in self.candidates.iter().cloned().enumerate() {
            let prober = self.clone();
            probes.spawn(async move {
                let outcome = prober.probe(&endpoint).await;
                (index, endpoint.id, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(self.candidates.len());
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::error!("[Discovery] probe task panicked: {}", e),
            }
        }
        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut report = DiscoveryReport::default();
        for (_, id, outcome) in outcomes {
            match outcome {
                Ok(_) => report.discovered.push(id),
                Err(e) => report.failed.push(FailedProbe {
                    id,
                    error: e.to_string(),
                }),
            }
        }
        report.total_agents = self.store.len().await;

        tracing::info!(
            "[Discovery] Discovery completed. Found {} of {} agents",
            report.discovered.len(),
            self.candidates.len()
        );
        self.log
            .record_discovery(
                EventKind::DiscoveryComplete,
                format!(
                    "Discovery completed. Found {} agents",
                    report.discovered.len()
                ),
                Some(json!({
                    "total_agents": report.total_agents,
                    "registered_agents": self.store.ids().await,
                })),
            )
            .await;
        report
    }

    /// Dynamic self-registration: the document is fetched and validated
    /// before the agent is accepted.
    pub async fn register(&self, agent_id: &str, card_url: &str) -> Result<AgentRecord, ServerError> {
        if agent_id.trim().is_empty() {
            return Err(ServerError::BadRequest("agent id is required".to_string()));
        }
        if card_url.trim().is_empty() {
            return Err(ServerError::BadRequest("cardUrl is required".to_string()));
        }

        let doc = match self.fetch(card_url).await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("[Discovery] Registration of {} failed: {}", agent_id, e);
                self.log
                    .record_discovery(
                        EventKind::AgentError,
                        format!("Failed to register {}: {}", agent_id, e),
                        Some(json!({ "id": agent_id, "cardUrl": card_url })),
                    )
                    .await;
                return Err(e);
            }
        };

        let name = doc.name.clone().unwrap_or_else(|| agent_id.to_string());
        let mut record = build_record(agent_id, &name, card_url, doc);
        record.registered_at = Some(Utc::now());
        self.store.upsert(record.clone()).await;

        tracing::info!("[Discovery] Registered {} ({})", record.name, record.id);
        self.log
            .record_discovery(
                EventKind::AgentRegistered,
                format!("Agent {} registered dynamically", record.name),
                Some(json!({ "id": record.id, "cardUrl": record.card_url })),
            )
            .await;
        Ok(record)
    }

    pub async fn unregister(&self, agent_id: &str) -> Result<AgentRecord, ServerError> {
        let removed = self
            .store
            .remove(agent_id)
            .await
            .ok_or_else(|| ServerError::NotFound(format!("Agent {} not found", agent_id)))?;

        tracing::info!("[Discovery] Unregistered {}", agent_id);
        self.log
            .record_discovery(
                EventKind::AgentUnregistered,
                format!("Agent {} unregistered", removed.name),
                Some(json!({ "id": agent_id })),
            )
            .await;
        Ok(removed)
    }
}

fn build_record(id: &str, name: &str, card_url: &str, doc: DiscoveryDocument) -> AgentRecord {
    AgentRecord {
        id: id.to_string(),
        name: name.to_string(),
        version: doc.version,
        card_url: card_url.to_string(),
        dispatch_endpoint: doc.endpoints.dispatch,
        status_endpoint: doc.endpoints.status,
        events_endpoint: doc.endpoints.events,
        capabilities: doc.capabilities,
        availability: Availability::Online,
        last_seen: Utc::now(),
        registered_at: None,
        health: None,
        card: doc.raw,
    }
}
