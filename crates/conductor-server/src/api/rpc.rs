//! JSON-RPC 2.0 endpoint powered by `conductor_core::rpc`.
//!
//! `POST /rpc` takes every method call; `GET /rpc/methods` lists them.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use conductor_core::rpc::RpcRouter;
use conductor_core::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(rpc_handler))
        .route("/methods", get(list_methods))
}

/// Malformed bodies are answered with an `Invalid request` envelope rather
/// than an HTTP rejection.
async fn rpc_handler(State(state): State<AppState>, body: String) -> Json<serde_json::Value> {
    let rpc = RpcRouter::new(state);
    let raw = rpc.handle_request(&body).await;
    Json(serde_json::from_str(&raw).unwrap_or_default())
}

async fn list_methods(State(state): State<AppState>) -> Json<serde_json::Value> {
    let rpc = RpcRouter::new(state);
    Json(serde_json::json!({ "methods": rpc.method_list() }))
}
