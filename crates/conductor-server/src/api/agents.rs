//! Registry REST surface.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use conductor_core::error::ServerError;
use conductor_core::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_agents))
        .route("/register", post(register_agent))
        .route("/{id}", get(get_agent).delete(unregister_agent))
}

async fn list_agents(State(state): State<AppState>) -> Json<serde_json::Value> {
    let agents = state.agent_store.list().await;
    Json(serde_json::json!({
        "count": agents.len(),
        "agents": agents,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /api/agents/{id}: the record merged with its latest health snapshot.
async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let record = state.agent_store.require(&id).await?;
    let health = record.health_or_unknown();
    let mut body = serde_json::to_value(&record)
        .map_err(|e| ServerError::Internal(format!("Failed to serialize agent: {}", e)))?;
    body["health"] = health;
    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    id: Option<String>,
    #[serde(alias = "card_url")]
    card_url: Option<String>,
}

async fn register_agent(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServerError> {
    let (Some(id), Some(card_url)) = (body.id, body.card_url) else {
        return Err(ServerError::BadRequest(
            "Missing agent ID or card URL".to_string(),
        ));
    };

    let record = state.prober.register(&id, &card_url).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "registered",
            "agentId": record.id,
            "agent": record,
            "message": "Agent registered successfully",
        })),
    ))
}

async fn unregister_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    state.prober.unregister(&id).await?;
    Ok(Json(serde_json::json!({
        "status": "unregistered",
        "agentId": id,
    })))
}
