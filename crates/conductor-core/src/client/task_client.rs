//! Remote Task Client: dispatches a task to an agent over JSON-RPC and polls
//! `tasks.status` until the task reaches a terminal state.
//!
//! Wire protocol (agent side):
//!
//! ```text
//! tasks.send   {operation, <field>: ...}  -> {"taskId": "...", "status": "accepted"}
//! tasks.status {"taskId": "..."}          -> {"status": "processing" | "completed" | "error",
//!                                             "result"?: {...}, "error"?: "..."}
//! ```

use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::config::ConductorConfig;
use crate::error::ServerError;
use crate::rpc::types::{JsonRpcRequest, JsonRpcResponse};
use crate::store::AgentStore;

/// A task accepted by a remote agent. Lives only for the owning step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHandle {
    pub agent_id: String,
    pub remote_task_id: String,
    /// Dispatch endpoint resolved when the task was sent.
    pub endpoint: String,
}

#[derive(Clone)]
pub struct RemoteTaskClient {
    store: AgentStore,
    http: reqwest::Client,
    poll_interval: Duration,
    default_timeout: Duration,
    dispatch_timeout: Duration,
}

impl RemoteTaskClient {
    pub fn new(store: AgentStore, http: reqwest::Client, config: &ConductorConfig) -> Self {
        Self {
            store,
            http,
            poll_interval: config.poll_interval(),
            default_timeout: config.task_timeout(),
            dispatch_timeout: config.dispatch_timeout(),
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Send `tasks.send` to the agent's dispatch endpoint.
    pub async fn dispatch(&self, agent_id: &str, payload: Value) -> Result<TaskHandle, ServerError> {
        let record = self.store.get(agent_id).await.ok_or_else(|| {
            ServerError::AgentUnreachable(format!("Agent {} is not registered", agent_id))
        })?;
        let endpoint = record.dispatch_endpoint.ok_or_else(|| {
            ServerError::AgentUnreachable(format!("Agent {} has no dispatch endpoint", agent_id))
        })?;

        tracing::info!("[TaskClient] Dispatching task to {} at {}", agent_id, endpoint);

        let result = self
            .call(&endpoint, "tasks.send", payload, self.dispatch_timeout)
            .await
            .map_err(|e| ServerError::DispatchFailed(format!("{}: {}", agent_id, e)))?;

        let task_id = result
            .get("taskId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ServerError::DispatchFailed(format!("{}: response carried no taskId", agent_id))
            })?;

        Ok(TaskHandle {
            agent_id: agent_id.to_string(),
            remote_task_id: task_id.to_string(),
            endpoint,
        })
    }

    /// Poll until the remote task is terminal or `timeout` elapses.
    ///
    /// Returns the agent's status document on `completed`. A remote `error`
    /// becomes `TaskFailed`; transport failures and non-terminal or
    /// malformed replies are retried until the deadline, then `TaskTimeout`.
    pub async fn await_completion(
        &self,
        handle: &TaskHandle,
        timeout: Duration,
    ) -> Result<Value, ServerError> {
        let deadline = Instant::now() + timeout;
        let params = json!({ "taskId": handle.remote_task_id });

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            match self
                .call(&handle.endpoint, "tasks.status", params.clone(), remaining)
                .await
            {
                Ok(status) => match status.get("status").and_then(Value::as_str) {
                    Some("completed") => {
                        tracing::info!(
                            "[TaskClient] Task {} on {} completed",
                            handle.remote_task_id,
                            handle.agent_id
                        );
                        return Ok(status);
                    }
                    Some("error") => {
                        return Err(ServerError::TaskFailed(format!(
                            "{}: {}",
                            handle.agent_id,
                            remote_error_message(&status)
                        )));
                    }
                    _ => {}
                },
                Err(e) => {
                    tracing::debug!(
                        "[TaskClient] Status poll for {} failed, retrying: {}",
                        handle.remote_task_id,
                        e
                    );
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }

        Err(ServerError::TaskTimeout(format!(
            "task {} on {} did not finish within {:?}",
            handle.remote_task_id, handle.agent_id, timeout
        )))
    }

    /// One JSON-RPC round trip. Returns the `result` member.
    async fn call(
        &self,
        endpoint: &str,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, String> {
        let request = JsonRpcRequest::new(method, params);
        let response = self
            .http
            .post(endpoint)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }

        let envelope: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| format!("malformed response envelope: {}", e))?;
        if let Some(err) = envelope.error {
            return Err(format!("error {}: {}", err.code, err.message));
        }
        envelope
            .result
            .ok_or_else(|| "response has neither result nor error".to_string())
    }
}

/// The `error` member of a terminal status document, either a plain string
/// or a `{code, message}` object.
fn remote_error_message(status: &Value) -> String {
    match status.get("error") {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Object(err)) => match err.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => Value::Object(err.clone()).to_string(),
        },
        _ => "remote task reported an error".to_string(),
    }
}
