//! Workflow templates and their execution across remote agents.
//!
//! ```text
//! template.yaml ──► WorkflowTemplate ──► WorkflowCatalog
//!                                            │
//!                         submit(name, input)▼
//!                                      WorkflowEngine ──► RemoteTaskClient ──► agents
//!                                            │
//!                                 WorkflowStore / ProgressLog
//! ```

pub mod catalog;
pub mod engine;
pub mod merge;
pub mod schema;

pub use catalog::WorkflowCatalog;
pub use engine::WorkflowEngine;
pub use schema::{OutputFormat, StepSpec, WorkflowTemplate};
