//! `conductor discover` — One discovery pass over the configured agents.

use conductor_core::state::AppState;

use super::print_json;

pub async fn run(state: &AppState, with_health: bool) -> Result<(), String> {
    println!(
        "Probing {} configured agent(s)...",
        state.prober.candidates().len()
    );
    let report = state.prober.discover_all().await;

    for failed in &report.failed {
        println!("  ✗ {}: {}", failed.id, failed.error);
    }

    if with_health {
        if let Some(summary) = state.health_monitor.run_cycle().await {
            println!("  {}/{} agents healthy", summary.healthy, summary.total);
        }
    }

    let agents = state.agent_store.list().await;
    print_json(&serde_json::json!({
        "report": report,
        "agents": agents,
    }));
    Ok(())
}
