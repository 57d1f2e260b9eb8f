//! Health Monitor: periodic status probes that flip agent availability.

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::json;
use tokio::task::{JoinHandle, JoinSet};

use crate::config::ConductorConfig;
use crate::events::ProgressLog;
use crate::models::agent::{AgentRecord, Availability, HealthSnapshot, HealthStatus};
use crate::models::event::EventKind;
use crate::store::AgentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub healthy: usize,
    pub total: usize,
}

#[derive(Clone)]
pub struct HealthMonitor {
    store: AgentStore,
    log: ProgressLog,
    http: reqwest::Client,
    interval: Duration,
    timeout: Duration,
}

impl HealthMonitor {
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
            interval: config.health_interval(),
            timeout: config.health_timeout(),
        }
    }

    /// Probe one agent's status endpoint. Only a 2xx reply carrying a JSON
    /// document counts as healthy.
    pub async fn probe(&self, record: &AgentRecord) -> HealthSnapshot {
        let Some(url) = record.status_endpoint.as_deref() else {
            return HealthSnapshot::unhealthy("Status endpoint unreachable");
        };

        let started = Instant::now();
        let response = match self.http.get(url).timeout(self.timeout).send().await {
            Ok(resp) => resp,
            Err(e) => return HealthSnapshot::unhealthy(e.to_string()),
        };
        if !response.status().is_success() {
            return HealthSnapshot::unhealthy(format!("HTTP {}", response.status()));
        }
        match response.json::<serde_json::Value>().await {
            Ok(data) => HealthSnapshot::healthy(started.elapsed().as_millis() as u64, data),
            Err(e) => HealthSnapshot::unhealthy(format!("invalid status document: {}", e)),
        }
    }

    /// One probe pass over every registered agent. Returns `None` when the
    /// registry is empty.
    pub async fn run_cycle(&self) -> Option<HealthSummary> {
        let agents = self.store.list().await;
        if agents.is_empty() {
            return None;
        }

        self.log
            .record_discovery(
                EventKind::HealthCheckStart,
                format!("Starting health check for {} agents", agents.len()),
                None,
            )
            .await;

        let mut probes = JoinSet::new();
        for record in agents.iter().cloned() {
            let monitor = self.clone();
            probes.spawn(async move {
                let snapshot = monitor.probe(&record).await;
                (record.id, snapshot)
            });
        }

        let mut healthy = 0;
        while let Some(joined) = probes.join_next().await {
            let (agent_id, snapshot) = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("[Health] probe task panicked: {}", e);
                    continue;
                }
            };
            let availability = if snapshot.status == HealthStatus::Healthy {
                healthy += 1;
                Availability::Online
            } else {
                tracing::warn!(
                    "[Health] {} is unhealthy: {}",
                    agent_id,
                    snapshot.error.as_deref().unwrap_or("unknown error")
                );
                Availability::Offline
            };
            self.store
                .set_availability(&agent_id, availability, snapshot)
                .await;
        }

        let summary = HealthSummary {
            healthy,
            total: agents.len(),
        };
        tracing::info!(
            "[Health] Health check completed. {}/{} agents healthy",
            summary.healthy,
            summary.total
        );
        self.log
            .record_discovery(
                EventKind::HealthCheckComplete,
                format!(
                    "Health check completed. {}/{} agents healthy",
                    summary.healthy, summary.total
                ),
                Some(json!(summary)),
            )
            .await;
        Some(summary)
    }

    /// Run `run_cycle` forever, sleeping `interval` before each pass.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!("[Health] Monitor started (interval {:?})", self.interval);
            loop {
                tokio::time::sleep(self.interval).await;
                self.run_cycle().await;
            }
        })
    }
}
