//! Pipeline parameters: per-run limits for the review use cases.

use std::time::Duration;
use vetting_domain::DEFAULT_TOKEN_BUDGET;

use crate::services::explainer::DEFAULT_EXPLAINER_MAX_TOKENS;
use crate::services::policy_router::DEFAULT_POLICY_TOP_K;

/// Parameters that control one review run.
///
/// | Field | Used by |
/// |-------|---------|
/// | `token_budget` | [`ProcessReviewUseCase`](crate::use_cases::process_review::ProcessReviewUseCase) |
/// | `policy_top_k` | [`PolicyRouter`](crate::services::PolicyRouter) |
/// | `explainer_max_tokens` | [`Explainer`](crate::services::Explainer) |
/// | `stale_after` | [`GetReviewStatusUseCase`](crate::use_cases::get_review_status::GetReviewStatusUseCase) |
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineParams {
    /// Token ceiling for all LLM calls of one run.
    pub token_budget: u64,
    /// Policy chunks retrieved per agent.
    pub policy_top_k: usize,
    /// Completion ceiling for the explanation.
    pub explainer_max_tokens: u32,
    /// A review still pending after this long is treated as lost.
    pub stale_after: Duration,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            token_budget: DEFAULT_TOKEN_BUDGET,
            policy_top_k: DEFAULT_POLICY_TOP_K,
            explainer_max_tokens: DEFAULT_EXPLAINER_MAX_TOKENS,
            stale_after: Duration::from_secs(120),
        }
    }
}

impl PipelineParams {
    // ==================== Builder Methods ====================

    pub fn with_token_budget(mut self, budget: u64) -> Self {
        self.token_budget = budget;
        self
    }

    pub fn with_policy_top_k(mut self, top_k: usize) -> Self {
        self.policy_top_k = top_k;
        self
    }

    pub fn with_explainer_max_tokens(mut self, max_tokens: u32) -> Self {
        self.explainer_max_tokens = max_tokens;
        self
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PipelineParams::default();
        assert_eq!(params.token_budget, 50_000);
        assert_eq!(params.policy_top_k, 10);
        assert_eq!(params.explainer_max_tokens, 256);
        assert_eq!(params.stale_after, Duration::from_secs(120));
    }

    #[test]
    fn test_builder() {
        let params = PipelineParams::default()
            .with_token_budget(10_000)
            .with_stale_after(Duration::from_secs(30));
        assert_eq!(params.token_budget, 10_000);
        assert_eq!(params.stale_after, Duration::from_secs(30));
    }
}
