//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command and reuses the
//! conductor-core domain logic in-process through `AppState`.

pub mod discover;
pub mod rpc;
pub mod server;
pub mod workflow;

use std::sync::Arc;

use conductor_core::state::{AppState, AppStateInner};
use conductor_core::ConductorConfig;

/// Load the configuration, exiting with a message when it is unusable.
pub fn load_config(config_path: Option<&str>) -> ConductorConfig {
    ConductorConfig::load(config_path).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    })
}

/// Initialize a shared `AppState` for the in-process commands.
///
/// This mirrors `conductor_server::create_app_state` without binding any
/// listener.
pub fn init_state(config: ConductorConfig) -> AppState {
    let inner = AppStateInner::new(config).unwrap_or_else(|e| {
        eprintln!("Failed to initialize coordinator: {}", e);
        std::process::exit(1);
    });
    Arc::new(inner)
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}
