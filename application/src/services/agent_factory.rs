//! Agent factory
//!
//! Turns an [`AgentConfig`] and its retrieved policies into a callable
//! [`PolicyAgent`]. Every agent shares one prompt shape and result schema;
//! only the config data differs.

use super::llm_client::{CallOptions, LlmClient};
use crate::error::PipelineError;
use crate::ports::llm_gateway::LlmGateway;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use vetting_domain::{
    AgentConfig, AgentFindings, AgentPromptTemplate, Listing, PolicyMatch, SubAgentResult,
    TokenTracker,
};

pub struct AgentFactory<G: LlmGateway + 'static> {
    client: Arc<LlmClient<G>>,
    schema: Arc<Value>,
}

impl<G: LlmGateway + 'static> AgentFactory<G> {
    pub fn new(client: Arc<LlmClient<G>>) -> Self {
        Self {
            client,
            schema: Arc::new(AgentPromptTemplate::result_schema()),
        }
    }

    pub fn create_policy_agent(
        &self,
        config: AgentConfig,
        policies: &[PolicyMatch],
    ) -> PolicyAgent<G> {
        let system_prompt =
            AgentPromptTemplate::resolve_system_prompt(&config.system_prompt_template, policies);
        let tool_name = AgentPromptTemplate::tool_name(&config.name);
        PolicyAgent {
            client: Arc::clone(&self.client),
            schema: Arc::clone(&self.schema),
            config,
            system_prompt,
            tool_name,
        }
    }
}

/// A configured policy agent, ready to evaluate listings
pub struct PolicyAgent<G: LlmGateway + 'static> {
    client: Arc<LlmClient<G>>,
    schema: Arc<Value>,
    config: AgentConfig,
    system_prompt: String,
    tool_name: String,
}

impl<G: LlmGateway + 'static> PolicyAgent<G> {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Check one listing. Consumed tokens are charged to `tracker` even when
    /// the returned payload turns out to be invalid.
    pub async fn evaluate(
        &self,
        listing: &Listing,
        tracker: &TokenTracker,
    ) -> Result<SubAgentResult, PipelineError> {
        let options = CallOptions {
            skip_redaction: self.config.options.skip_redaction,
            max_tokens: self.config.options.max_tokens,
        };
        let completion = self
            .client
            .complete_structured::<AgentFindings>(
                &self.system_prompt,
                &AgentPromptTemplate::user_prompt(listing),
                &self.schema,
                &self.tool_name,
                options,
            )
            .await?;

        let total = tracker.add(completion.tokens_used)?;
        completion.data.validate()?;

        debug!(
            agent = %self.config.name,
            verdict = %completion.data.verdict,
            confidence = completion.data.confidence,
            tokens_total = total,
            "Agent evaluated listing"
        );
        Ok(completion.data.into_result(self.config.name.clone()))
    }
}
