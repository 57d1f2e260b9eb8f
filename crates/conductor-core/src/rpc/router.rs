//! Transport-agnostic JSON-RPC 2.0 dispatcher.
//!
//! `RpcRouter` takes an `AppState` and dispatches incoming JSON-RPC requests
//! to the appropriate method handler. It has no HTTP dependency, so the same
//! router serves the axum `/rpc` endpoint and the CLI's in-process `rpc`
//! command.

use serde::Serialize;

use crate::state::AppState;

use super::error::RpcError;
use super::methods;
use super::types::*;

/// Transport-agnostic JSON-RPC router.
///
/// ```ignore
/// let router = RpcRouter::new(app_state);
/// let response_json = router.handle_request(raw_json_str).await;
/// ```
#[derive(Clone)]
pub struct RpcRouter {
    state: AppState,
}

impl RpcRouter {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Handle a raw JSON string and return the serialized response.
    pub async fn handle_request(&self, raw: &str) -> String {
        let response = match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => return self.handle_value(value).await.to_string(),
            Err(e) => JsonRpcResponse::error(
                None,
                INVALID_REQUEST,
                format!("Invalid request: {}", e),
            ),
        };
        serde_json::to_string(&response).unwrap_or_else(|_| {
            r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Failed to serialize response"},"id":null}"#.into()
        })
    }

    /// Handle a pre-parsed `serde_json::Value`, e.g. from axum's `Json`.
    pub async fn handle_value(&self, value: serde_json::Value) -> serde_json::Value {
        let id = value.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(req) => req,
            Err(e) => {
                return serde_json::to_value(JsonRpcResponse::error(
                    id,
                    INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ))
                .unwrap_or_default();
            }
        };

        let response = self.dispatch(request).await;
        serde_json::to_value(response).unwrap_or_default()
    }

    pub async fn dispatch(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        if req.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                req.id,
                INVALID_REQUEST,
                "Invalid JSON-RPC version, expected \"2.0\"",
            );
        }

        let id = req.id.clone();
        let params = req
            .params
            .unwrap_or(serde_json::Value::Object(Default::default()));

        match self.route(&req.method, params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => {
                tracing::debug!("[Rpc] {} failed: {}", req.method, err);
                err.to_response(id)
            }
        }
    }

    async fn route(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        match method {
            "agent.getCapabilities" => {
                to_value(methods::agent::get_capabilities(&self.state).await?)
            }

            // ----- Workflow runs -----
            "tasks.send" => {
                let p = parse_params(params)?;
                to_value(methods::tasks::send(&self.state, p).await?)
            }
            "tasks.status" => {
                let p = parse_params(params)?;
                to_value(methods::tasks::status(&self.state, p).await?)
            }

            // ----- Registry / catalog -----
            "orchestration.agents.list" => {
                to_value(methods::orchestration::list_agents(&self.state).await?)
            }
            "orchestration.workflows.list" => {
                to_value(methods::orchestration::list_workflows(&self.state).await?)
            }

            _ => Err(RpcError::MethodNotFound(format!(
                "Method not found: {}",
                method
            ))),
        }
    }

    /// All supported method names.
    pub fn method_list(&self) -> Vec<&'static str> {
        vec![
            "agent.getCapabilities",
            "tasks.send",
            "tasks.status",
            "orchestration.agents.list",
            "orchestration.workflows.list",
        ]
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, RpcError> {
    serde_json::from_value(value)
        .map_err(|e| RpcError::InvalidParams(e.to_string()))
}

fn to_value<T: Serialize>(value: T) -> Result<serde_json::Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::Internal(e.to_string()))
}
