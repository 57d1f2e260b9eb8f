//! `conductor workflow` — Run, list and validate workflow templates.

use conductor_core::models::WorkflowStatus;
use conductor_core::state::AppState;
use conductor_core::workflow::WorkflowTemplate;

use super::print_json;

/// Discover the configured agents, then run `template` in-process and print
/// the terminal instance.
pub async fn run(
    state: &AppState,
    template: &str,
    input: &str,
    discover: bool,
) -> Result<(), String> {
    let input: serde_json::Value =
        serde_json::from_str(input).map_err(|e| format!("Invalid JSON input: {}", e))?;

    if discover {
        let report = state.prober.discover_all().await;
        tracing::debug!(
            "discovered {:?}, failed {}",
            report.discovered,
            report.failed.len()
        );
        println!(
            "Discovered {} agent(s), {} unreachable",
            report.discovered.len(),
            report.failed.len()
        );
    }

    let instance = state
        .engine
        .run(template, input)
        .await
        .map_err(|e| e.to_string())?;

    print_json(&serde_json::to_value(&instance).map_err(|e| e.to_string())?);

    match instance.status {
        WorkflowStatus::Completed => Ok(()),
        _ => Err(format!(
            "Workflow {} failed: {}",
            instance.id,
            instance.error.as_deref().unwrap_or("unknown error")
        )),
    }
}

/// List the catalog's templates.
pub async fn list(state: &AppState) -> Result<(), String> {
    for template in state.catalog.list() {
        println!(
            "{} ({} step(s), {:?})",
            template.name,
            template.steps.len(),
            template.output_format
        );
        if !template.description.is_empty() {
            println!("   {}", template.description);
        }
    }
    Ok(())
}

/// Validate a template YAML file without executing it.
pub async fn validate(template_file: &str) -> Result<(), String> {
    let template = WorkflowTemplate::from_file(template_file).map_err(|e| e.to_string())?;

    println!("✅ Template '{}' is valid", template.name);
    println!("   Steps: {}", template.steps.len());

    for (i, step) in template.steps.iter().enumerate() {
        let mut notes = Vec::new();
        if step.parallel_group {
            notes.push("parallel".to_string());
        }
        if let Some(dep) = step.depends_on {
            notes.push(format!("depends on step {}", dep + 1));
        }
        println!(
            "   {}. {} - {} (input: {}){}",
            i + 1,
            step.agent_id,
            step.operation,
            step.input_field,
            if notes.is_empty() {
                String::new()
            } else {
                format!(" [{}]", notes.join(", "))
            }
        );
    }

    Ok(())
}
