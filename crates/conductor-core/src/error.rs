//! Core error type for the coordinator.
//!
//! `ServerError` is used throughout the core domain (stores, discovery, the
//! task client, the engine and RPC). When the `axum` feature is enabled, it
//! also implements `IntoResponse` so it can be used directly as an axum
//! handler error type.

#[derive(Debug, Clone, thiserror::Error)]
pub enum ServerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown workflow type: {0}")]
    UnknownWorkflowType(String),

    #[error("Agent unreachable: {0}")]
    AgentUnreachable(String),

    #[error("Dispatch failed: {0}")]
    DispatchFailed(String),

    #[error("Task failed: {0}")]
    TaskFailed(String),

    #[error("Task timeout: {0}")]
    TaskTimeout(String),

    #[error("Discovery validation failed: {0}")]
    DiscoveryValidationFailed(String),
}

// ---------------------------------------------------------------------------
// axum integration (opt-in via feature flag)
// ---------------------------------------------------------------------------

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_)
            | ServerError::UnknownWorkflowType(_)
            | ServerError::DiscoveryValidationFailed(_) => StatusCode::BAD_REQUEST,
            ServerError::AgentUnreachable(_) | ServerError::DispatchFailed(_) => {
                StatusCode::BAD_GATEWAY
            }
            ServerError::TaskTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ServerError::Internal(_) | ServerError::Config(_) | ServerError::TaskFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
