//! `conductor server` — Start the coordinator HTTP server.

use conductor_core::ConductorConfig;

pub async fn run(
    host: String,
    port: u16,
    conductor: ConductorConfig,
    discover_on_start: bool,
    health_loop: bool,
) -> Result<(), String> {
    let config = conductor_server::ServerConfig {
        host: host.clone(),
        port,
        conductor,
        discover_on_start,
        health_loop,
    };

    println!("Starting conductor server on {}:{}...", host, port);

    let addr = conductor_server::start_server(config).await?;
    println!("Conductor server listening on http://{}", addr);

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for Ctrl+C: {}", e))?;

    println!("\nShutting down...");
    Ok(())
}
