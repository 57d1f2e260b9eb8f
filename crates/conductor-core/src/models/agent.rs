use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reachability of an agent as last observed by discovery or health probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    Unknown,
    Online,
    Offline,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

/// Outcome of the most recent status probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The agent's own status document, when one was returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl HealthSnapshot {
    pub fn healthy(latency_ms: u64, data: serde_json::Value) -> Self {
        Self {
            status: HealthStatus::Healthy,
            checked_at: Utc::now(),
            latency_ms: Some(latency_ms),
            error: None,
            data: Some(data),
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            checked_at: Utc::now(),
            latency_ms: None,
            error: Some(error.into()),
            data: None,
        }
    }
}

/// Registry entry for one discovered or registered agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    pub version: String,
    pub card_url: String,
    pub dispatch_endpoint: Option<String>,
    pub status_endpoint: Option<String>,
    pub events_endpoint: Option<String>,
    pub capabilities: Vec<String>,
    pub availability: Availability,
    pub last_seen: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthSnapshot>,
    /// The discovery document the record was built from.
    pub card: serde_json::Value,
}

impl AgentRecord {
    /// Health to report for this agent, `unknown` until the first probe.
    pub fn health_or_unknown(&self) -> serde_json::Value {
        match &self.health {
            Some(h) => serde_json::to_value(h).unwrap_or_default(),
            None => serde_json::json!({ "status": "unknown" }),
        }
    }
}
