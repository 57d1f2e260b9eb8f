use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use conductor_core::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rediscover", post(rediscover))
        .route("/events", get(list_events))
}

/// POST /api/discovery/rediscover: one synchronous pass over the candidates.
async fn rediscover(State(state): State<AppState>) -> Json<serde_json::Value> {
    let report = state.prober.discover_all().await;
    Json(serde_json::json!({
        "status": "rediscovery_complete",
        "agentsFound": report.total_agents,
        "report": report,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    limit: Option<usize>,
}

async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<serde_json::Value> {
    let events = state.progress.discovery_events(query.limit).await;
    Json(serde_json::json!({
        "count": events.len(),
        "events": events,
    }))
}
