//! Agent discovery: discovery-document validation, the prober that fills the
//! registry, and the periodic health monitor.

pub mod card;
pub mod health;
pub mod prober;

pub use card::{CardEndpoints, DiscoveryDocument, PROTOCOL};
pub use health::HealthMonitor;
pub use prober::{DiscoveryProber, DiscoveryReport};
