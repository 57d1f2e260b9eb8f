//! Conductor Server - HTTP front end of the agent coordinator.
//!
//! An axum adapter over `conductor-core`, providing:
//! - the registry REST surface (`/api/agents`, `/api/discovery`, `/api/health`, `/api/capabilities`)
//! - the workflow REST surface (`/api/workflows`)
//! - the JSON-RPC endpoint (`/rpc`) shared with agents
//! - the progress feed as Server-Sent Events (`/events`)
//! - the coordinator's own discovery document and status probe
//!
//! Starting the server also runs an initial discovery pass and the periodic
//! health monitor in the background.

pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use conductor_core::models::HealthStatus;
use conductor_core::state::{AppState, AppStateInner};
use conductor_core::ConductorConfig;

/// Configuration for the coordinator's HTTP server.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub conductor: ConductorConfig,
    /// Run one discovery pass over the configured agents at startup.
    pub discover_on_start: bool,
    /// Spawn the periodic health monitor.
    pub health_loop: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3010,
            conductor: ConductorConfig::default(),
            discover_on_start: true,
            health_loop: true,
        }
    }
}

/// Default `RUST_LOG` filter when none is set.
pub const DEFAULT_LOG_FILTER: &str =
    "conductor_core=info,conductor_server=info,conductor_cli=info,tower_http=info";

/// Install the global tracing subscriber. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .try_init();
}

/// Build a shared `AppState` from a coordinator configuration.
pub fn create_app_state(config: ConductorConfig) -> Result<AppState, String> {
    let inner = AppStateInner::new(config)
        .map_err(|e| format!("Failed to initialize coordinator: {}", e))?;
    Ok(Arc::new(inner))
}

/// Start the coordinator server.
///
/// Returns the actual address the server is listening on.
pub async fn start_server(config: ServerConfig) -> Result<SocketAddr, String> {
    init_tracing();

    tracing::info!(
        "Starting conductor server on {}:{}",
        config.host,
        config.port
    );

    let state = create_app_state(config.conductor.clone())?;
    start_server_with_state(config, state).await
}

/// The complete router over a pre-built state.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::api_router())
        .route("/api/health", axum::routing::get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server with a pre-built `AppState`, then kick off
/// background discovery and health monitoring as configured.
pub async fn start_server_with_state(
    config: ServerConfig,
    state: AppState,
) -> Result<SocketAddr, String> {
    let app = build_router(state.clone());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get local address: {}", e))?;

    tracing::info!("Conductor server listening on {}", local_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    if config.discover_on_start {
        let prober = state.prober.clone();
        tokio::spawn(async move {
            let report = prober.discover_all().await;
            tracing::info!(
                "[Discovery] Initial discovery registered {} agents",
                report.total_agents
            );
        });
    }
    if config.health_loop {
        state.health_monitor.clone().spawn();
    }

    Ok(local_addr)
}

/// GET /api/health: latest probe outcome per agent plus a summary.
async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::Json<serde_json::Value> {
    let agents = state.agent_store.list().await;
    let mut per_agent = serde_json::Map::new();
    let (mut healthy, mut unhealthy) = (0, 0);
    for agent in &agents {
        match agent.health.as_ref().map(|h| h.status) {
            Some(HealthStatus::Healthy) => healthy += 1,
            Some(HealthStatus::Unhealthy) => unhealthy += 1,
            _ => {}
        }
        per_agent.insert(agent.id.clone(), agent.health_or_unknown());
    }

    axum::Json(serde_json::json!({
        "agents": per_agent,
        "summary": {
            "total": agents.len(),
            "healthy": healthy,
            "unhealthy": unhealthy,
        },
        "server": "conductor-server",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
