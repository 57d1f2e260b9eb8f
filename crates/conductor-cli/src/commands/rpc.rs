//! `conductor rpc` — Raw JSON-RPC invocation against an in-process coordinator.

use conductor_core::rpc::RpcRouter;
use conductor_core::state::AppState;

use super::print_json;

pub async fn call(state: &AppState, method: &str, params_str: &str) -> Result<(), String> {
    let response = invoke(state, method, params_str).await?;
    print_json(&response);
    Ok(())
}

/// Build the request envelope and route it, returning the response envelope.
pub async fn invoke(
    state: &AppState,
    method: &str,
    params_str: &str,
) -> Result<serde_json::Value, String> {
    let params: serde_json::Value =
        serde_json::from_str(params_str).map_err(|e| format!("Invalid JSON params: {}", e))?;

    let router = RpcRouter::new(state.clone());
    Ok(router
        .handle_value(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        }))
        .await)
}
