pub mod agent;
pub mod event;
pub mod workflow;

pub use agent::{AgentRecord, Availability, HealthSnapshot, HealthStatus};
pub use event::{EventKind, ProgressUpdate};
pub use workflow::{WorkflowInstance, WorkflowStatus};
