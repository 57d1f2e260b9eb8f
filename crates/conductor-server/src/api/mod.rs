pub mod agents;
pub mod capabilities;
pub mod discovery;
pub mod events;
pub mod identity;
pub mod rpc;
pub mod workflows;

use axum::Router;

use conductor_core::state::AppState;

/// Build the complete API router with all sub-routes.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/agents", agents::router())
        .nest("/api/discovery", discovery::router())
        .nest("/api/capabilities", capabilities::router())
        .nest("/api/workflows", workflows::router())
        .nest("/rpc", rpc::router())
        .merge(events::router())
        .merge(identity::router())
}
