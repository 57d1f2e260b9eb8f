//! Conductor Core — transport-agnostic domain logic for the agent coordinator.
//!
//! This crate contains the coordination layer: the agent registry with its
//! discovery and health subsystems, the workflow template catalog, the remote
//! task client and the workflow execution engine. It has **no HTTP framework
//! dependency** by default, making it suitable for use in:
//!
//! - HTTP servers (via `conductor-server`)
//! - CLI tools (via `conductor-cli`)
//! - Tests that drive the engine in-process
//!
//! # Feature Flags
//!
//! - `axum` — Enables `IntoResponse` impl on `ServerError` for use in axum handlers.

pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod models;
pub mod rpc;
pub mod state;
pub mod store;
pub mod workflow;

// Convenience re-exports
pub use config::ConductorConfig;
pub use error::ServerError;
pub use state::{AppState, AppStateInner};
