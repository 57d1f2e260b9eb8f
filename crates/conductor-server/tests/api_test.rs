//! HTTP-level tests for the conductor server.
//!
//! Each test binds the full router on `127.0.0.1:0` and talks to it with a
//! real HTTP client, alongside a minimal echo agent.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use conductor_core::config::ConductorConfig;
use conductor_core::discovery::DiscoveryDocument;
use conductor_core::state::{AppState, AppStateInner, SERVICE_ID, SERVICE_NAME};
use conductor_core::workflow::{WorkflowCatalog, WorkflowTemplate};
use conductor_server::build_router;

const ECHO_ONCE: &str = r#"
name: echo_once
steps:
  - agent: echo-agent
    operation: echo
    input_field: text
"#;

const NESTED: &str = r#"
name: nested
output_format: separate
steps:
  - agent: conductor-orchestrator
    operation: echo_once
    input_field: input
"#;

struct TestServer {
    base: String,
    state: AppState,
    http: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let config = ConductorConfig {
            agents: Vec::new(),
            discovery_timeout_secs: 2,
            health_timeout_secs: 1,
            poll_interval_ms: 20,
            task_timeout_secs: 3,
            public_url: base.clone(),
            ..ConductorConfig::default()
        };
        let mut catalog = WorkflowCatalog::builtin();
        catalog.insert(WorkflowTemplate::from_yaml(ECHO_ONCE).unwrap()).unwrap();
        catalog.insert(WorkflowTemplate::from_yaml(NESTED).unwrap()).unwrap();

        let state: AppState = Arc::new(AppStateInner::with_catalog(config, catalog));
        let app = build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base,
            state,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.http.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self.http.post(self.url(path)).json(&body).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn delete(&self, path: &str) -> (u16, Value) {
        let resp = self.http.delete(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn wait_terminal(&self, workflow_id: &str) -> Value {
        for _ in 0..250 {
            let (_, wf) = self.get(&format!("/api/workflows/{}", workflow_id)).await;
            if wf["status"] != "processing" {
                return wf;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("workflow {} never finished", workflow_id);
    }
}

/// An agent whose tasks complete on the first poll with `{"echo": true}`.
async fn start_echo_agent() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let card = json!({
        "agent": {
            "id": "echo-agent",
            "name": "Echo Agent",
            "version": "0.3.0",
            "capabilities": ["echo"],
            "endpoints": {
                "rpc": format!("{}/rpc", base),
                "status": format!("{}/status", base),
            }
        },
        "spec": { "protocol": "agent2agent", "version": "1.0.0" }
    });

    let app = Router::new()
        .route("/.well-known/agent.json", get(move || async move { Json(card) }))
        .route("/status", get(|| async { Json(json!({ "status": "ok" })) }))
        .route(
            "/rpc",
            post(|Json(req): Json<Value>| async move {
                let result = match req["method"].as_str() {
                    Some("tasks.send") => json!({ "taskId": "echo-1", "status": "accepted" }),
                    _ => json!({ "taskId": "echo-1", "status": "completed", "result": { "echo": true } }),
                };
                Json(json!({ "jsonrpc": "2.0", "id": req["id"], "result": result }))
            }),
        );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("{}/.well-known/agent.json", base)
}

#[tokio::test]
async fn test_identity_documents() {
    let server = TestServer::start().await;

    let (status, card) = server.get("/.well-known/agent.json").await;
    assert_eq!(status, 200);
    let doc = DiscoveryDocument::parse(card).unwrap();
    assert_eq!(doc.id.as_deref(), Some(SERVICE_ID));
    assert_eq!(doc.endpoints.dispatch, Some(server.url("/rpc")));

    let (status, body) = server.get("/status").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["registeredAgents"], 0);
}

#[tokio::test]
async fn test_register_list_and_unregister() {
    let server = TestServer::start().await;
    let card_url = start_echo_agent().await;

    let (status, body) = server
        .post("/api/agents/register", json!({ "id": "echo-agent", "cardUrl": card_url }))
        .await;
    assert_eq!(status, 201);
    assert_eq!(body["status"], "registered");
    assert_eq!(body["agent"]["name"], "Echo Agent");

    let (_, list) = server.get("/api/agents").await;
    assert_eq!(list["count"], 1);

    let (status, agent) = server.get("/api/agents/echo-agent").await;
    assert_eq!(status, 200);
    assert_eq!(agent["version"], "0.3.0");
    assert_eq!(agent["health"]["status"], "unknown");

    let (_, caps) = server.get("/api/capabilities").await;
    assert_eq!(caps["totalCapabilities"], 1);
    assert_eq!(caps["agents"]["echo-agent"]["capabilities"][0], "echo");

    let (status, _) = server.delete("/api/agents/echo-agent").await;
    assert_eq!(status, 200);
    let (status, _) = server.delete("/api/agents/echo-agent").await;
    assert_eq!(status, 404);
    let (status, _) = server.get("/api/agents/echo-agent").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_register_rejects_bad_requests() {
    let server = TestServer::start().await;

    let (status, _) = server
        .post("/api/agents/register", json!({ "id": "lonely" }))
        .await;
    assert_eq!(status, 400);

    let (status, body) = server
        .post(
            "/api/agents/register",
            json!({ "id": "ghost", "cardUrl": "http://127.0.0.1:9/.well-known/agent.json" }),
        )
        .await;
    assert_eq!(status, 502);
    assert!(body["error"].as_str().unwrap().contains("unreachable"));
    assert!(server.state.agent_store.is_empty().await);
}

#[tokio::test]
async fn test_health_and_discovery_endpoints() {
    let server = TestServer::start().await;
    let card_url = start_echo_agent().await;
    server
        .post("/api/agents/register", json!({ "id": "echo-agent", "cardUrl": card_url }))
        .await;

    let summary = server.state.health_monitor.run_cycle().await.unwrap();
    assert_eq!(summary.healthy, 1);

    let (_, health) = server.get("/api/health").await;
    assert_eq!(health["summary"]["total"], 1);
    assert_eq!(health["summary"]["healthy"], 1);
    assert_eq!(health["agents"]["echo-agent"]["status"], "healthy");

    let (_, events) = server.get("/api/discovery/events?limit=2").await;
    assert_eq!(events["count"], 2);
    assert_eq!(events["events"][1]["type"], "health_check_complete");

    let (status, body) = server.post("/api/discovery/rediscover", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "rediscovery_complete");
    assert_eq!(body["agentsFound"], 1);
}

#[tokio::test]
async fn test_workflow_submit_and_poll() {
    let server = TestServer::start().await;
    let card_url = start_echo_agent().await;
    server
        .post("/api/agents/register", json!({ "id": "echo-agent", "cardUrl": card_url }))
        .await;

    let (status, accepted) = server
        .post("/api/workflows", json!({ "workflow": "echo_once", "input": { "text": "hi" } }))
        .await;
    assert_eq!(status, 202);
    assert_eq!(accepted["status"], "accepted");

    let wf = server
        .wait_terminal(accepted["workflowId"].as_str().unwrap())
        .await;
    assert_eq!(wf["status"], "completed");
    assert_eq!(wf["result"]["workflow"], "echo_once");
    assert_eq!(wf["stepResults"].as_array().unwrap().len(), 1);

    let (_, listing) = server.get("/api/workflows").await;
    assert_eq!(listing["active"][0]["status"], "completed");

    let (_, templates) = server.get("/api/workflows/templates").await;
    assert_eq!(templates["count"], 5);
}

#[tokio::test]
async fn test_workflow_error_statuses() {
    let server = TestServer::start().await;

    let (status, _) = server.get("/api/workflows/no-such-run").await;
    assert_eq!(status, 404);

    let (status, _) = server
        .post("/api/workflows", json!({ "workflow": "echo_once", "input": [1, 2] }))
        .await;
    assert_eq!(status, 400);

    let (status, accepted) = server
        .post("/api/workflows", json!({ "workflow": "no_such_template" }))
        .await;
    assert_eq!(status, 202);
    let wf = server
        .wait_terminal(accepted["workflowId"].as_str().unwrap())
        .await;
    assert_eq!(wf["status"], "error");
    assert!(wf["error"].as_str().unwrap().contains("no_such_template"));
}

#[tokio::test]
async fn test_rpc_endpoint() {
    let server = TestServer::start().await;

    let resp = server
        .http
        .post(server.url("/rpc"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32600);

    let (_, body) = server
        .post(
            "/rpc",
            json!({ "jsonrpc": "2.0", "id": 7, "method": "agent.getCapabilities" }),
        )
        .await;
    assert_eq!(body["id"], 7);
    assert_eq!(body["result"]["agent"], SERVICE_NAME);

    let (_, body) = server
        .post("/rpc", json!({ "jsonrpc": "2.0", "id": 8, "method": "nope" }))
        .await;
    assert_eq!(body["error"]["code"], -32601);

    let (_, methods) = server.get("/rpc/methods").await;
    assert!(methods["methods"]
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m == "tasks.send"));
}

#[tokio::test]
async fn test_coordinator_runs_as_step_agent_of_itself() {
    let server = TestServer::start().await;
    let echo_card = start_echo_agent().await;
    server
        .post("/api/agents/register", json!({ "id": "echo-agent", "cardUrl": echo_card }))
        .await;
    let (status, _) = server
        .post(
            "/api/agents/register",
            json!({ "id": SERVICE_ID, "cardUrl": server.url("/.well-known/agent.json") }),
        )
        .await;
    assert_eq!(status, 201);

    let (_, accepted) = server
        .post(
            "/api/workflows",
            json!({ "workflow": "nested", "input": { "input": { "text": "hi" } } }),
        )
        .await;
    let wf = server
        .wait_terminal(accepted["workflowId"].as_str().unwrap())
        .await;
    assert_eq!(wf["status"], "completed");
    assert_eq!(wf["result"]["workflow"], "nested");
    assert_eq!(
        wf["result"]["individual_results"][0]["templateName"],
        "echo_once"
    );
}

#[tokio::test]
async fn test_coordinator_step_accepts_scalar_input() {
    let server = TestServer::start().await;
    let echo_card = start_echo_agent().await;
    server
        .post("/api/agents/register", json!({ "id": "echo-agent", "cardUrl": echo_card }))
        .await;
    server
        .post(
            "/api/agents/register",
            json!({ "id": SERVICE_ID, "cardUrl": server.url("/.well-known/agent.json") }),
        )
        .await;

    let (_, accepted) = server
        .post(
            "/api/workflows",
            json!({ "workflow": "nested", "input": { "input": "Hello World" } }),
        )
        .await;
    let wf = server
        .wait_terminal(accepted["workflowId"].as_str().unwrap())
        .await;
    assert_eq!(wf["status"], "completed", "outer run failed: {}", wf);
    assert_eq!(
        wf["result"]["individual_results"][0]["status"],
        "completed"
    );
}

#[tokio::test]
async fn test_event_feed_starts_with_connected() {
    let server = TestServer::start().await;
    let mut resp = server.http.get(server.url("/events")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let chunk = tokio::time::timeout(Duration::from_secs(2), resp.chunk())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let text = String::from_utf8_lossy(&chunk);
    assert!(text.contains("event: connected"));
}
