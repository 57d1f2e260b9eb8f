//! Workflow REST surface.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use conductor_core::error::ServerError;
use conductor_core::models::WorkflowInstance;
use conductor_core::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_workflows).post(submit_workflow))
        .route("/templates", get(list_templates))
        .route("/{id}", get(get_workflow))
}

/// Templates plus a summary of every instance.
async fn list_workflows(State(state): State<AppState>) -> Json<serde_json::Value> {
    let instances: Vec<serde_json::Value> = state
        .workflow_store
        .list()
        .await
        .into_iter()
        .map(|wf| {
            serde_json::json!({
                "id": wf.id,
                "templateName": wf.template_name,
                "status": wf.status,
                "startedAt": wf.started_at,
                "completedAt": wf.completed_at,
            })
        })
        .collect();

    Json(serde_json::json!({
        "workflows": state.catalog.list(),
        "count": state.catalog.len(),
        "active": instances,
    }))
}

async fn list_templates(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "templates": state.catalog.list(),
        "count": state.catalog.len(),
    }))
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    #[serde(alias = "template", alias = "templateName")]
    workflow: String,
    #[serde(default, alias = "input_data", alias = "inputData")]
    input: serde_json::Value,
}

async fn submit_workflow(
    State(state): State<AppState>,
    Json(body): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServerError> {
    let id = state.engine.submit(&body.workflow, body.input).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "workflowId": id,
            "status": "accepted",
            "message": format!("Workflow {} accepted for processing", body.workflow),
        })),
    ))
}

async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WorkflowInstance>, ServerError> {
    state
        .workflow_store
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("Workflow {} not found", id)))
}
