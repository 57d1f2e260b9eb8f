use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a progress log entry.
///
/// Discovery and health events go to the bounded discovery buffer; the
/// `Processing`/`Completed`/`Error` kinds describe workflow transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    DiscoveryStart,
    AgentDiscovered,
    AgentError,
    DiscoveryComplete,
    AgentRegistered,
    AgentUnregistered,
    HealthCheckStart,
    HealthCheckComplete,
    Processing,
    Completed,
    Error,
}

/// One immutable entry in the progress/event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    /// Workflow id, or `discovery` for the registry's event buffer.
    pub owner_id: String,
    /// Position within the owner's log; never reused.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
