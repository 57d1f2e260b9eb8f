//! In-process mock agents for integration tests.
//!
//! Each `MockAgent` is a real axum server on `127.0.0.1:0` that serves a
//! discovery document, a status probe and the `tasks.send` / `tasks.status`
//! envelope, so discovery, health and task dispatch go over real HTTP.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use conductor_core::config::{ConductorConfig, KnownEndpoint};

/// How the mock resolves a task.
#[derive(Clone)]
pub enum Behavior {
    /// Completes with the value computed from the `tasks.send` params.
    Complete(Arc<dyn Fn(&Value) -> Value + Send + Sync>),
    /// Reports a terminal `error` carrying this value.
    Fail(Value),
    /// Stays `processing` forever.
    Hang,
    /// Answers `tasks.send` with an error envelope.
    RejectDispatch,
}

impl Behavior {
    pub fn returning(result: Value) -> Self {
        Behavior::Complete(Arc::new(move |_| result.clone()))
    }

    /// Echo the params back as the result.
    pub fn echo() -> Self {
        Behavior::Complete(Arc::new(|params| params.clone()))
    }
}

pub struct MockState {
    pub id: String,
    pub base_url: String,
    pub behavior: Behavior,
    /// Status polls answered with `processing` before the terminal state.
    pub pending_polls: u32,
    pub healthy: bool,
    pub valid_card: bool,
    pub received: Vec<Value>,
    polls: HashMap<String, u32>,
    next_task: u32,
}

#[derive(Clone)]
pub struct MockAgent {
    pub id: String,
    pub base_url: String,
    pub state: Arc<Mutex<MockState>>,
}

impl MockAgent {
    pub async fn start(id: &str, behavior: Behavior) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(MockState {
            id: id.to_string(),
            base_url: base_url.clone(),
            behavior,
            pending_polls: 1,
            healthy: true,
            valid_card: true,
            received: Vec::new(),
            polls: HashMap::new(),
            next_task: 0,
        }));

        let app = Router::new()
            .route("/.well-known/agent.json", get(card))
            .route("/status", get(status))
            .route("/rpc", post(rpc))
            .with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            id: id.to_string(),
            base_url,
            state,
        }
    }

    pub fn card_url(&self) -> String {
        format!("{}/.well-known/agent.json", self.base_url)
    }

    pub fn endpoint(&self) -> KnownEndpoint {
        KnownEndpoint::new(&self.id, &format!("{} agent", self.id), self.card_url())
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.state.lock().unwrap().healthy = healthy;
    }

    pub fn set_valid_card(&self, valid: bool) {
        self.state.lock().unwrap().valid_card = valid;
    }

    pub fn set_pending_polls(&self, n: u32) {
        self.state.lock().unwrap().pending_polls = n;
    }

    /// Params of every accepted `tasks.send`.
    pub fn received(&self) -> Vec<Value> {
        self.state.lock().unwrap().received.clone()
    }
}

/// Fast timings for tests, with the given agents as discovery candidates.
pub fn test_config(agents: &[&MockAgent]) -> ConductorConfig {
    ConductorConfig {
        agents: agents.iter().map(|a| a.endpoint()).collect(),
        discovery_timeout_secs: 2,
        health_timeout_secs: 1,
        poll_interval_ms: 20,
        task_timeout_secs: 3,
        ..ConductorConfig::default()
    }
}

/// A card URL nothing listens on.
pub fn dead_endpoint(id: &str) -> KnownEndpoint {
    KnownEndpoint::new(id, "Dead agent", "http://127.0.0.1:9/.well-known/agent.json")
}

pub async fn eventually<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

async fn card(State(state): State<Arc<Mutex<MockState>>>) -> Json<Value> {
    let s = state.lock().unwrap();
    if !s.valid_card {
        return Json(json!({ "agent": { "id": s.id } }));
    }
    Json(json!({
        "agent": {
            "id": s.id,
            "name": format!("Mock {}", s.id),
            "version": "1.0.0",
            "capabilities": [format!("{}.run", s.id)],
            "endpoints": {
                "rpc": format!("{}/rpc", s.base_url),
                "status": format!("{}/status", s.base_url),
                "events": format!("{}/events", s.base_url),
            }
        },
        "spec": { "protocol": "agent2agent", "version": "1.0.0" }
    }))
}

async fn status(State(state): State<Arc<Mutex<MockState>>>) -> impl IntoResponse {
    let s = state.lock().unwrap();
    if s.healthy {
        (StatusCode::OK, Json(json!({ "status": "ok", "agent": s.id }))).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "down").into_response()
    }
}

async fn rpc(State(state): State<Arc<Mutex<MockState>>>, Json(req): Json<Value>) -> Json<Value> {
    let id = req.get("id").cloned().unwrap_or(Value::Null);
    let params = req.get("params").cloned().unwrap_or(json!({}));
    let mut s = state.lock().unwrap();

    match req.get("method").and_then(Value::as_str) {
        Some("tasks.send") => {
            if matches!(s.behavior, Behavior::RejectDispatch) {
                return Json(json!({
                    "jsonrpc": "2.0", "id": id,
                    "error": { "code": -32603, "message": "Internal error: rejected" }
                }));
            }
            s.next_task += 1;
            let task_id = format!("{}-task-{}", s.id, s.next_task);
            s.received.push(params);
            s.polls.insert(task_id.clone(), 0);
            Json(json!({
                "jsonrpc": "2.0", "id": id,
                "result": { "taskId": task_id, "status": "accepted" }
            }))
        }
        Some("tasks.status") => {
            let task_id = params
                .get("taskId")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let pending = s.pending_polls;
            let Some(count) = s.polls.get_mut(&task_id) else {
                return Json(json!({
                    "jsonrpc": "2.0", "id": id,
                    "error": { "code": -32602, "message": "Task not found" }
                }));
            };
            *count += 1;
            let done = *count > pending;
            let index: usize = task_id
                .rsplit('-')
                .next()
                .and_then(|n| n.parse().ok())
                .unwrap_or(1);
            let sent = s.received.get(index - 1).cloned().unwrap_or(Value::Null);

            let result = match (&s.behavior, done) {
                (Behavior::Hang, _) | (_, false) => json!({ "status": "processing" }),
                (Behavior::Complete(f), true) => json!({
                    "status": "completed",
                    "result": (**f)(&sent),
                    "completedAt": "2026-01-01T00:00:00Z"
                }),
                (Behavior::Fail(msg), true) => json!({ "status": "error", "error": msg }),
                (Behavior::RejectDispatch, true) => json!({ "status": "processing" }),
            };
            Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
        }
        _ => Json(json!({
            "jsonrpc": "2.0", "id": id,
            "error": { "code": -32601, "message": "Method not found" }
        })),
    }
}
