//! Registry and catalog listings.
//!
//! Methods:
//! - `orchestration.agents.list`
//! - `orchestration.workflows.list`

use serde::Serialize;

use crate::models::agent::AgentRecord;
use crate::rpc::error::RpcError;
use crate::state::AppState;
use crate::workflow::WorkflowTemplate;

#[derive(Debug, Serialize)]
pub struct AgentsResult {
    pub agents: Vec<AgentRecord>,
    pub count: usize,
}

pub async fn list_agents(state: &AppState) -> Result<AgentsResult, RpcError> {
    let agents = state.agent_store.list().await;
    Ok(AgentsResult {
        count: agents.len(),
        agents,
    })
}

#[derive(Debug, Serialize)]
pub struct WorkflowsResult {
    pub workflows: Vec<WorkflowTemplate>,
    pub count: usize,
}

pub async fn list_workflows(state: &AppState) -> Result<WorkflowsResult, RpcError> {
    let workflows: Vec<WorkflowTemplate> = state.catalog.list().into_iter().cloned().collect();
    Ok(WorkflowsResult {
        count: workflows.len(),
        workflows,
    })
}
