//! Agent domain module
//!
//! Policy agents are data, not types: every agent is an [`AgentConfig`] row
//! evaluated through the same prompt template and result schema.

pub mod config;
pub mod dispatch;

pub use config::{AgentConfig, AgentOptions};
pub use dispatch::AgentDispatchPlan;
