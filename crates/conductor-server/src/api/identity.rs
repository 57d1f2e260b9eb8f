//! The coordinator as an agent: its discovery document and status probe.

use axum::{extract::State, routing::get, Json, Router};

use conductor_core::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/.well-known/agent.json", get(agent_card))
        .route("/status", get(status))
}

async fn agent_card(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.agent_card())
}

async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.status_document().await)
}
