//! Domain layer for listing-vetting
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Review
//!
//! Every submitted [`Listing`] gets exactly one [`Review`], which moves through
//! a small status machine while a pipeline run checks the listing against the
//! tenant's policy agents.
//!
//! ## Agents and Verdicts
//!
//! - **Agent**: an [`AgentConfig`] row plus the policy text retrieved for it
//! - **Verdict**: each agent returns approved, rejected or escalated with a
//!   confidence; [`aggregate`] fuses them into one [`AggregatedDecision`]
//!
//! ## Guardrails
//!
//! - [`redact`]: strips personal data from outbound prompts
//! - [`TokenTracker`]: fail-closed token budget per run

pub mod agent;
pub mod core;
pub mod guardrails;
pub mod listing;
pub mod policy;
pub mod prompt;
pub mod review;
pub mod verdict;

// Re-export commonly used types
pub use agent::{AgentConfig, AgentDispatchPlan, AgentOptions};
pub use core::error::DomainError;
pub use guardrails::{DEFAULT_TOKEN_BUDGET, TokenTracker, redact};
pub use listing::{Listing, NewListing};
pub use policy::{PolicyChunk, PolicyMatch, chunk_policy};
pub use prompt::{AgentPromptTemplate, ExplainerPromptTemplate};
pub use review::{NodeTrace, Review, ReviewJob, ReviewStatus, ReviewTrace, Stage};
pub use verdict::{
    AgentFindings, AgentViolation, AggregatedDecision, Severity, SubAgentResult, Verdict,
    aggregate,
};
