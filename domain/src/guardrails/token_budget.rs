//! Per-run token budget

use crate::core::error::DomainError;
use std::sync::atomic::{AtomicU64, Ordering};

pub const DEFAULT_TOKEN_BUDGET: u64 = 50_000;

/// Accumulates token usage for one pipeline run.
///
/// Shared by concurrently running agents; `add` is lock-free. Fails closed:
/// the first `add` that takes usage past the budget returns an error, and so
/// does every later one.
#[derive(Debug)]
pub struct TokenTracker {
    used: AtomicU64,
    budget: u64,
}

impl TokenTracker {
    pub fn new(budget: u64) -> Self {
        Self {
            used: AtomicU64::new(0),
            budget,
        }
    }

    /// Record `tokens` and return the new total.
    pub fn add(&self, tokens: u64) -> Result<u64, DomainError> {
        let used = self.used.fetch_add(tokens, Ordering::SeqCst) + tokens;
        if used > self.budget {
            return Err(DomainError::TokenBudgetExceeded {
                used,
                budget: self.budget,
            });
        }
        Ok(used)
    }

    pub fn total(&self) -> u64 {
        self.used.load(Ordering::SeqCst)
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

}

impl Default for TokenTracker {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_BUDGET)
    }
}
