use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ServerError;

/// Protocol name every discovery document must declare.
pub const PROTOCOL: &str = "agent2agent";

/// Endpoint URIs advertised in a discovery document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEndpoints {
    /// Task dispatch / status-poll endpoint (`rpc` in the wire document).
    #[serde(alias = "rpc", skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct IdentitySection {
    id: Option<String>,
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    capabilities: Vec<String>,
    #[serde(default)]
    endpoints: CardEndpoints,
}

#[derive(Debug, Clone, Deserialize)]
struct SpecSection {
    protocol: Option<String>,
    version: Option<String>,
}

/// A validated discovery document (`/.well-known/agent.json`).
///
/// The wire shape is `{ "agent": {..identity..}, "spec": {"protocol", "version"} }`.
#[derive(Debug, Clone)]
pub struct DiscoveryDocument {
    pub id: Option<String>,
    pub name: Option<String>,
    pub version: String,
    pub capabilities: Vec<String>,
    pub endpoints: CardEndpoints,
    pub protocol_version: Option<String>,
    pub raw: Value,
}

impl DiscoveryDocument {
    /// Validate a fetched document. Both sections must be present and the
    /// spec section must name the `agent2agent` protocol.
    pub fn parse(raw: Value) -> Result<Self, ServerError> {
        let agent = raw.get("agent").filter(|v| v.is_object()).ok_or_else(|| {
            ServerError::DiscoveryValidationFailed("missing 'agent' section".to_string())
        })?;
        let spec = raw.get("spec").filter(|v| v.is_object()).ok_or_else(|| {
            ServerError::DiscoveryValidationFailed("missing 'spec' section".to_string())
        })?;

        let identity: IdentitySection = serde_json::from_value(agent.clone()).map_err(|e| {
            ServerError::DiscoveryValidationFailed(format!("malformed 'agent' section: {}", e))
        })?;
        let spec: SpecSection = serde_json::from_value(spec.clone()).map_err(|e| {
            ServerError::DiscoveryValidationFailed(format!("malformed 'spec' section: {}", e))
        })?;

        match spec.protocol.as_deref() {
            Some(PROTOCOL) => {}
            Some(other) => {
                return Err(ServerError::DiscoveryValidationFailed(format!(
                    "unsupported protocol '{}'",
                    other
                )))
            }
            None => {
                return Err(ServerError::DiscoveryValidationFailed(
                    "spec section has no protocol".to_string(),
                ))
            }
        }

        Ok(Self {
            id: identity.id,
            name: identity.name,
            version: identity.version.unwrap_or_else(|| "unknown".to_string()),
            capabilities: identity.capabilities,
            endpoints: identity.endpoints,
            protocol_version: spec.version,
            raw,
        })
    }
}
