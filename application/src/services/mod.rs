//! Pipeline services composed by the review use case

pub mod agent_factory;
pub mod explainer;
pub mod llm_client;
pub mod policy_router;

pub use agent_factory::{AgentFactory, PolicyAgent};
pub use explainer::Explainer;
pub use llm_client::{CallOptions, Completion, LlmClient, LlmClientConfig, LlmError};
pub use policy_router::PolicyRouter;
