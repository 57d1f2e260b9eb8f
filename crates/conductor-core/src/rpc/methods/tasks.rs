//! RPC methods for workflow runs, in the same shape agents use for tasks,
//! so a coordinator can serve as a step of another coordinator's workflow.
//!
//! Methods:
//! - `tasks.send`   — accept a workflow run
//! - `tasks.status` — status document of a run

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::workflow::WorkflowInstance;
use crate::rpc::error::RpcError;
use crate::state::AppState;

pub const DEFAULT_WORKFLOW: &str = "text_analysis_pipeline";

// ---------------------------------------------------------------------------
// tasks.send
// ---------------------------------------------------------------------------

/// `{workflow, input_data}`. A step dispatch from another coordinator sends
/// `{operation, <field>: ...}` instead; the operation then names the template
/// and the remaining fields are the input. An `input` that is not an object
/// stays a field of that input.
#[derive(Debug, Deserialize)]
pub struct SendParams {
    pub workflow: Option<String>,
    pub operation: Option<String>,
    #[serde(alias = "inputData", alias = "input")]
    pub input_data: Option<Value>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub workflow_id: String,
    pub task_id: String,
    pub status: &'static str,
    pub message: String,
}

pub async fn send(state: &AppState, params: SendParams) -> Result<SendResult, RpcError> {
    let workflow = params
        .workflow
        .or(params.operation)
        .unwrap_or_else(|| DEFAULT_WORKFLOW.to_string());
    let input = match params.input_data {
        Some(Value::Object(fields)) => Value::Object(fields),
        None | Some(Value::Null) => Value::Object(params.rest),
        Some(scalar) => {
            let mut fields = params.rest;
            fields.insert("input".to_string(), scalar);
            Value::Object(fields)
        }
    };

    let workflow_id = state.engine.submit(&workflow, input).await?;
    Ok(SendResult {
        task_id: workflow_id.clone(),
        workflow_id,
        status: "accepted",
        message: format!("Workflow {} accepted for processing", workflow),
    })
}

// ---------------------------------------------------------------------------
// tasks.status
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusParams {
    pub workflow_id: Option<String>,
    pub task_id: Option<String>,
}

pub async fn status(state: &AppState, params: StatusParams) -> Result<WorkflowInstance, RpcError> {
    let id = params
        .workflow_id
        .or(params.task_id)
        .ok_or_else(|| RpcError::InvalidParams("workflowId or taskId is required".into()))?;
    state
        .workflow_store
        .get(&id)
        .await
        .ok_or_else(|| RpcError::NotFound(format!("Workflow {} not found", id)))
}
