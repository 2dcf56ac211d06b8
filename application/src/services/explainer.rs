//! Decision explainer

use super::llm_client::{CallOptions, LlmClient};
use crate::error::PipelineError;
use crate::ports::llm_gateway::LlmGateway;
use std::sync::Arc;
use vetting_domain::{
    AggregatedDecision, ExplainerPromptTemplate, Listing, SubAgentResult, TokenTracker,
};

pub const DEFAULT_EXPLAINER_MAX_TOKENS: u32 = 256;

/// Writes a short prose explanation of an aggregated decision
pub struct Explainer<G: LlmGateway + 'static> {
    client: Arc<LlmClient<G>>,
    max_tokens: u32,
}

impl<G: LlmGateway + 'static> Explainer<G> {
    pub fn new(client: Arc<LlmClient<G>>) -> Self {
        Self {
            client,
            max_tokens: DEFAULT_EXPLAINER_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub async fn explain(
        &self,
        decision: &AggregatedDecision,
        listing: &Listing,
        results: &[SubAgentResult],
        tracker: &TokenTracker,
    ) -> Result<String, PipelineError> {
        let user = ExplainerPromptTemplate::user_prompt(decision, listing, results);
        let completion = self
            .client
            .complete_text(
                ExplainerPromptTemplate::system(),
                &user,
                CallOptions::default().with_max_tokens(self.max_tokens),
            )
            .await?;
        tracker.add(completion.tokens_used)?;
        Ok(completion.data.trim().to_string())
    }
}
