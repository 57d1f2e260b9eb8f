//! `agent.getCapabilities`: the coordinator describing itself.

use serde::Serialize;

use crate::rpc::error::RpcError;
use crate::state::{AppState, CAPABILITIES, SERVICE_NAME, SERVICE_VERSION};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitiesResult {
    pub capabilities: Vec<&'static str>,
    pub agent: &'static str,
    pub version: &'static str,
    pub workflows: Vec<String>,
    pub registered_agents: Vec<String>,
}

pub async fn get_capabilities(state: &AppState) -> Result<CapabilitiesResult, RpcError> {
    Ok(CapabilitiesResult {
        capabilities: CAPABILITIES.to_vec(),
        agent: SERVICE_NAME,
        version: SERVICE_VERSION,
        workflows: state.catalog.names(),
        registered_agents: state.agent_store.ids().await,
    })
}
