//! Coordinator configuration.
//!
//! Loaded from YAML (camelCase keys), every field optional:
//!
//! ```yaml
//! healthIntervalSecs: 30
//! taskTimeoutSecs: 30
//! maxConcurrentWorkflows: 10
//! agents:
//!   - id: agent-a-text-processor
//!     name: Text Processing Agent
//!     cardUrl: http://localhost:3001/.well-known/agent.json
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ServerError;

/// A statically configured discovery candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownEndpoint {
    pub id: String,
    pub name: String,
    #[serde(alias = "card_url")]
    pub card_url: String,
}

impl KnownEndpoint {
    pub fn new(id: &str, name: &str, card_url: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            card_url: card_url.into(),
        }
    }

    fn local(id: &str, name: &str, port: u16) -> Self {
        Self::new(
            id,
            name,
            format!("http://localhost:{}/.well-known/agent.json", port),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConductorConfig {
    /// Static candidate list for the discovery prober.
    pub agents: Vec<KnownEndpoint>,
    pub discovery_timeout_secs: u64,
    /// Timeout for the `tasks.send` round trip; polling uses `task_timeout_secs`.
    pub dispatch_timeout_secs: u64,
    pub health_interval_secs: u64,
    pub health_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub task_timeout_secs: u64,
    pub max_concurrent_workflows: usize,
    /// Size of the discovery/health event ring buffer.
    pub event_capacity: usize,
    /// Optional directory of extra YAML workflow templates.
    pub templates_dir: Option<String>,
    /// Base URL advertised in the coordinator's own discovery document.
    pub public_url: String,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            agents: vec![
                KnownEndpoint::local("agent-a-text-processor", "Text Processing Agent", 3001),
                KnownEndpoint::local("agent-b-math-calculator", "Math Calculator Agent", 3002),
                KnownEndpoint::local(
                    "agent-c-sentiment-analyzer",
                    "Sentiment Analysis Agent",
                    3003,
                ),
                KnownEndpoint::local(
                    "agent-d-language-detector",
                    "Language Detection Agent",
                    3004,
                ),
                KnownEndpoint::local(
                    "agent-e-intelligent-orchestrator",
                    "Intelligent Orchestrator Agent",
                    3005,
                ),
            ],
            discovery_timeout_secs: 5,
            dispatch_timeout_secs: 5,
            health_interval_secs: 30,
            health_timeout_secs: 3,
            poll_interval_ms: 1000,
            task_timeout_secs: 30,
            max_concurrent_workflows: 10,
            event_capacity: 100,
            templates_dir: None,
            public_url: "http://localhost:3010".to_string(),
        }
    }
}

impl ConductorConfig {
    /// Parse a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ServerError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| ServerError::Config(format!("Failed to parse config YAML: {}", e)))
    }

    /// Load a configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Load from an explicit path, else `~/.conductor/config.yaml` if present,
    /// else defaults.
    pub fn load(path: Option<&str>) -> Result<Self, ServerError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(p) if p.is_file() => {
                tracing::info!("Loading config from {}", p.display());
                Self::from_file(p)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".conductor").join("config.yaml"))
}
