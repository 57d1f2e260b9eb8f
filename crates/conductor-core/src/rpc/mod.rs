//! Transport-agnostic JSON-RPC 2.0 layer.
//!
//! The envelope types are shared with the Remote Task Client; the router
//! serves the coordinator's own methods (`agent.getCapabilities`,
//! `tasks.send`, `tasks.status`, `orchestration.*`).

pub mod error;
pub mod methods;
pub mod router;
pub mod types;

pub use error::RpcError;
pub use router::RpcRouter;
pub use types::{JsonRpcRequest, JsonRpcResponse};
