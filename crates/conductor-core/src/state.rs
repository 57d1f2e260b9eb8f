//! Shared application state, plus the coordinator's own identity documents.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::client::RemoteTaskClient;
use crate::config::ConductorConfig;
use crate::discovery::{HealthMonitor, DiscoveryProber, PROTOCOL};
use crate::error::ServerError;
use crate::events::ProgressLog;
use crate::models::workflow::WorkflowStatus;
use crate::store::{AgentStore, WorkflowStore};
use crate::workflow::{WorkflowCatalog, WorkflowEngine};

pub const SERVICE_ID: &str = "conductor-orchestrator";
pub const SERVICE_NAME: &str = "Conductor Orchestrator";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Capabilities advertised when the coordinator is itself used as an agent.
pub const CAPABILITIES: &[&str] = &[
    "orchestration.workflow.execute",
    "orchestration.agents.coordinate",
    "orchestration.tasks.parallel",
    "orchestration.tasks.sequential",
    "orchestration.monitoring.realtime",
];

/// Shared state accessible by all API handlers, the RPC router and the CLI.
pub struct AppStateInner {
    pub config: ConductorConfig,
    pub agent_store: AgentStore,
    pub workflow_store: WorkflowStore,
    pub progress: ProgressLog,
    pub catalog: Arc<WorkflowCatalog>,
    pub prober: DiscoveryProber,
    pub health_monitor: HealthMonitor,
    pub task_client: RemoteTaskClient,
    pub engine: WorkflowEngine,
    pub started_at: DateTime<Utc>,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    /// Wire every component from a configuration. Fails only when extra
    /// templates cannot be loaded.
    pub fn new(config: ConductorConfig) -> Result<Self, ServerError> {
        let catalog = WorkflowCatalog::load(config.templates_dir.as_deref())?;
        Ok(Self::with_catalog(config, catalog))
    }

    pub fn with_catalog(config: ConductorConfig, catalog: WorkflowCatalog) -> Self {
        let http = reqwest::Client::builder()
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let agent_store = AgentStore::new();
        let workflow_store = WorkflowStore::new();
        let progress = ProgressLog::new(config.event_capacity);
        let catalog = Arc::new(catalog);

        let prober = DiscoveryProber::new(agent_store.clone(), progress.clone(), http.clone(), &config);
        let health_monitor =
            HealthMonitor::new(agent_store.clone(), progress.clone(), http.clone(), &config);
        let task_client = RemoteTaskClient::new(agent_store.clone(), http, &config);
        let engine = WorkflowEngine::new(
            catalog.clone(),
            task_client.clone(),
            workflow_store.clone(),
            progress.clone(),
            config.max_concurrent_workflows,
        );

        Self {
            config,
            agent_store,
            workflow_store,
            progress,
            catalog,
            prober,
            health_monitor,
            task_client,
            engine,
            started_at: Utc::now(),
        }
    }

    /// The coordinator's own discovery document.
    pub fn agent_card(&self) -> Value {
        let base = self.config.public_url.trim_end_matches('/');
        json!({
            "agent": {
                "id": SERVICE_ID,
                "name": SERVICE_NAME,
                "description": "Multi-agent discovery, health tracking and workflow orchestration",
                "version": SERVICE_VERSION,
                "capabilities": CAPABILITIES,
                "endpoints": {
                    "rpc": format!("{}/rpc", base),
                    "status": format!("{}/status", base),
                    "events": format!("{}/events", base),
                    "workflows": format!("{}/api/workflows", base),
                },
                "metadata": {
                    "type": "orchestrator",
                    "supportedFormats": ["application/json"],
                    "orchestration": {
                        "maxConcurrentWorkflows": self.config.max_concurrent_workflows,
                        "supportedWorkflowTypes": ["sequential", "parallel"],
                    },
                },
            },
            "spec": {
                "protocol": PROTOCOL,
                "version": "1.0.0",
            },
        })
    }

    /// Body of the coordinator's status probe.
    pub async fn status_document(&self) -> Value {
        json!({
            "status": "ok",
            "agent": SERVICE_NAME,
            "version": SERVICE_VERSION,
            "timestamp": Utc::now().to_rfc3339(),
            "startedAt": self.started_at.to_rfc3339(),
            "registeredAgents": self.agent_store.len().await,
            "activeWorkflows": self.workflow_store.count_by_status(WorkflowStatus::Processing).await,
            "availableSlots": self.engine.available_slots(),
            "discoveryEvents": self.progress.discovery_len().await,
            "availableWorkflows": self.catalog.names(),
        })
    }
}
