use axum::{extract::State, routing::get, Json, Router};

use conductor_core::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_capabilities))
}

/// GET /api/capabilities: capabilities of every registered agent.
async fn list_capabilities(State(state): State<AppState>) -> Json<serde_json::Value> {
    let agents = state.agent_store.list().await;
    let total: usize = agents.iter().map(|a| a.capabilities.len()).sum();

    let mut by_agent = serde_json::Map::new();
    for agent in agents {
        by_agent.insert(
            agent.id.clone(),
            serde_json::json!({
                "name": agent.name,
                "capabilities": agent.capabilities,
                "status": agent.availability.as_str(),
                "version": agent.version,
            }),
        );
    }

    Json(serde_json::json!({
        "agents": by_agent,
        "totalCapabilities": total,
    }))
}
