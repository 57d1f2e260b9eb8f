//! Integration tests for the conductor-cli commands.
//!
//! These exercise the same code paths as the binary against an in-process
//! coordinator with no configured agents, so nothing leaves the process.

use std::io::Write;
use std::sync::Arc;

use conductor_cli::commands;
use conductor_core::config::ConductorConfig;
use conductor_core::rpc::RpcRouter;
use conductor_core::state::{AppState, AppStateInner};
use conductor_core::workflow::WorkflowCatalog;

fn test_state() -> AppState {
    let config = ConductorConfig {
        agents: Vec::new(),
        ..ConductorConfig::default()
    };
    Arc::new(AppStateInner::with_catalog(config, WorkflowCatalog::builtin()))
}

fn template_file(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_workflows_list() {
    let state = test_state();
    let response = commands::rpc::invoke(&state, "orchestration.workflows.list", "{}")
        .await
        .unwrap();

    let result = response.get("result").expect("Expected result field");
    assert_eq!(result["count"], 3);
    let names: Vec<&str> = result["workflows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"text_analysis_pipeline"));
    assert!(names.contains(&"math_text_combo"));
    assert!(names.contains(&"multilingual_sentiment"));
}

#[tokio::test]
async fn test_rpc_rejects_invalid_params_json() {
    let state = test_state();
    let err = commands::rpc::invoke(&state, "tasks.status", "{oops")
        .await
        .unwrap_err();
    assert!(err.contains("Invalid JSON params"));
}

#[tokio::test]
async fn test_task_send_then_status() {
    let state = test_state();
    let router = RpcRouter::new(state.clone());

    let response = router
        .handle_value(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tasks.send",
            "params": { "workflow": "not_a_template", "input_data": { "text": "hi" } }
        }))
        .await;
    let result = response.get("result").expect("Expected result");
    assert_eq!(result["status"], "accepted");
    let task_id = result["taskId"].as_str().unwrap().to_string();

    let response = router
        .handle_value(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tasks.status",
            "params": { "taskId": task_id }
        }))
        .await;
    let instance = response.get("result").expect("Expected result");
    assert_eq!(instance["status"], "error");
    assert_eq!(instance["templateName"], "not_a_template");

    let response = router
        .handle_value(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tasks.status",
            "params": { "taskId": "missing" }
        }))
        .await;
    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn test_workflow_run_reports_failure_without_agents() {
    let state = test_state();
    let err = commands::workflow::run(&state, "text_analysis_pipeline", r#"{"text":"hello"}"#, false)
        .await
        .unwrap_err();
    assert!(err.contains("failed"));

    let runs = state.workflow_store.list().await;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].failed_step.as_ref().unwrap().index, 0);
}

#[tokio::test]
async fn test_workflow_run_rejects_non_object_input() {
    let state = test_state();
    let err = commands::workflow::run(&state, "text_analysis_pipeline", "[1]", false)
        .await
        .unwrap_err();
    assert!(err.contains("must be an object"));
    assert!(state.workflow_store.list().await.is_empty());
}

#[tokio::test]
async fn test_discover_with_no_candidates() {
    let state = test_state();
    commands::discover::run(&state, true).await.unwrap();
    assert!(state.agent_store.is_empty().await);
    assert_eq!(state.progress.discovery_len().await, 2);
}

#[tokio::test]
async fn test_validate_template_file() {
    let file = template_file(
        r#"
name: translate_then_score
description: Detect, then score
steps:
  - agent: agent-d-language-detector
    operation: detect
    input_field: text
  - agent: agent-c-sentiment-analyzer
    operation: analyze
    input_field: text
    dependsOn: 0
"#,
    );
    commands::workflow::validate(file.path().to_str().unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_validate_rejects_forward_dependency() {
    let file = template_file(
        r#"
name: broken
steps:
  - agent: agent-a
    depends_on: 0
"#,
    );
    let path = file.path().to_str().unwrap().to_string();
    let err = commands::workflow::validate(&path).await.unwrap_err();
    assert!(err.contains(&path));
}
