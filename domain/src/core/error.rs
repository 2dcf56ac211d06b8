//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid listing: {0}")]
    InvalidListing(String),

    #[error("Invalid agent configuration: {0}")]
    InvalidAgentConfig(String),

    #[error("Invalid agent result: {0}")]
    InvalidAgentResult(String),

    #[error("Token budget exceeded: {used} > {budget}")]
    TokenBudgetExceeded { used: u64, budget: u64 },

    #[error("Cannot aggregate empty results: all agents failed")]
    NoAgentResults,
}

impl DomainError {
    /// Check if this error was caused by malformed caller input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidListing(_) | DomainError::InvalidAgentConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_error_display() {
        let error = DomainError::TokenBudgetExceeded {
            used: 50_010,
            budget: 50_000,
        };
        assert_eq!(error.to_string(), "Token budget exceeded: 50010 > 50000");
    }

    #[test]
    fn test_is_validation() {
        assert!(DomainError::InvalidListing("title".to_string()).is_validation());
        assert!(DomainError::InvalidAgentConfig("name".to_string()).is_validation());
        assert!(!DomainError::NoAgentResults.is_validation());
        assert!(!DomainError::InvalidAgentResult("confidence".to_string()).is_validation());
    }
}
