//! Verdict domain
//!
//! Verdicts produced by individual policy agents and the decision rule that
//! fuses them into a single outcome.
//!
//! # Decision Rule
//!
//! ```text
//! any rejected @ confidence > 0.7   → rejected  (mean of those rejections)
//! all approved, mean > 0.8          → approved  (mean of all)
//! otherwise                         → escalated (mean of all)
//! ```

pub mod aggregation;
pub mod types;

pub use aggregation::{
    APPROVAL_CONFIDENCE_THRESHOLD, AggregatedDecision, REJECTION_CONFIDENCE_THRESHOLD, aggregate,
    merge_violations,
};
pub use types::{AgentFindings, AgentViolation, Severity, SubAgentResult, Verdict};
