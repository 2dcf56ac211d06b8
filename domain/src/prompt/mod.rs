//! Prompt domain
//!
//! Templates for the per-agent compliance check and for the explanation of
//! the final decision.

pub mod agent;
pub mod explainer;

pub use agent::{AgentPromptTemplate, NO_POLICIES_MESSAGE, POLICY_PLACEHOLDER};
pub use explainer::ExplainerPromptTemplate;
