//! Guardrails applied to every pipeline run
//!
//! - [`redact`] strips personal data before text leaves the process
//! - [`TokenTracker`] enforces the per-run token budget

pub mod redactor;
pub mod token_budget;

pub use redactor::{
    CC_PLACEHOLDER, EMAIL_PLACEHOLDER, PHONE_PLACEHOLDER, SSN_PLACEHOLDER, redact,
};
pub use token_budget::{DEFAULT_TOKEN_BUDGET, TokenTracker};
