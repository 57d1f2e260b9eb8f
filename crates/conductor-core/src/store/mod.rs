pub mod agent_store;
pub mod workflow_store;

pub use agent_store::AgentStore;
pub use workflow_store::WorkflowStore;
