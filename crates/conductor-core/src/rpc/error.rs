//! RPC error type that bridges `ServerError` to JSON-RPC errors.

use super::types;
use crate::error::ServerError;

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RpcError {
    pub fn code(&self) -> i64 {
        match self {
            RpcError::InvalidRequest(_) => types::INVALID_REQUEST,
            RpcError::MethodNotFound(_) => types::METHOD_NOT_FOUND,
            RpcError::InvalidParams(_) | RpcError::NotFound(_) => types::INVALID_PARAMS,
            RpcError::Internal(_) => types::INTERNAL_ERROR,
        }
    }

    pub fn to_response(&self, id: Option<serde_json::Value>) -> types::JsonRpcResponse {
        types::JsonRpcResponse::error(id, self.code(), self.to_string())
    }
}

impl From<ServerError> for RpcError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::NotFound(msg) => RpcError::NotFound(msg),
            ServerError::BadRequest(msg) => RpcError::InvalidParams(msg),
            e @ (ServerError::UnknownWorkflowType(_) | ServerError::DiscoveryValidationFailed(_)) => {
                RpcError::InvalidParams(e.to_string())
            }
            other => RpcError::Internal(other.to_string()),
        }
    }
}
