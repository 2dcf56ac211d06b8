//! LLM client with guardrails
//!
//! Wraps an [`LlmGateway`]: redacts the user prompt, applies a per-request
//! timeout, retries transient failures with backoff, and runs the whole retry
//! loop through a shared [`CircuitBreaker`].

use crate::ports::llm_gateway::{
    CompletionRequest, CompletionResponse, GatewayError, LlmGateway, ToolSpec,
};
use crate::resilience::{CircuitBreaker, CircuitError, RetryPolicy, retry_with_backoff};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use vetting_domain::{AgentPromptTemplate, redact};

/// Errors surfaced by [`LlmClient`]
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Circuit breaker '{0}' is open")]
    CircuitOpen(String),

    #[error("LLM request failed after {attempts} attempt(s): {source}")]
    RequestFailed {
        attempts: u32,
        #[source]
        source: GatewayError,
    },

    #[error("LLM response contained no text block")]
    MissingText,

    #[error("LLM response contained no '{0}' tool call")]
    MissingToolCall(String),

    #[error("LLM tool input did not match the result schema: {0}")]
    MalformedOutput(String),
}

/// Per-call options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    pub skip_redaction: bool,
    /// Falls back to [`LlmClientConfig::default_max_tokens`]
    pub max_tokens: Option<u32>,
}

impl CallOptions {
    pub fn with_skip_redaction(mut self, skip: bool) -> Self {
        self.skip_redaction = skip;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmClientConfig {
    pub default_max_tokens: u32,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for LlmClientConfig {
    fn default() -> Self {
        Self {
            default_max_tokens: 1024,
            request_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

/// A completion result and the tokens it cost
#[derive(Debug, Clone, PartialEq)]
pub struct Completion<T> {
    pub data: T,
    pub tokens_used: u64,
}

pub struct LlmClient<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    breaker: Arc<CircuitBreaker>,
    config: LlmClientConfig,
}

impl<G: LlmGateway + 'static> LlmClient<G> {
    pub fn new(gateway: Arc<G>, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            gateway,
            breaker,
            config: LlmClientConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LlmClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Free-text completion.
    pub async fn complete_text(
        &self,
        system: &str,
        user: &str,
        options: CallOptions,
    ) -> Result<Completion<String>, LlmError> {
        let request = self.request(system, user, options, None);
        let response = self.send(&request).await?;

        let text = response.text().ok_or(LlmError::MissingText)?.to_string();
        Ok(Completion {
            data: text,
            tokens_used: response.usage.total(),
        })
    }

    /// Completion forced through a single tool whose input follows `schema`.
    pub async fn complete_structured<T: DeserializeOwned>(
        &self,
        system: &str,
        user: &str,
        schema: &Value,
        tool_name: &str,
        options: CallOptions,
    ) -> Result<Completion<T>, LlmError> {
        let tool = ToolSpec {
            name: tool_name.to_string(),
            description: AgentPromptTemplate::tool_description().to_string(),
            input_schema: schema.clone(),
        };
        let request = self.request(system, user, options, Some(tool));
        let response = self.send(&request).await?;

        let input = response
            .tool_input(tool_name)
            .ok_or_else(|| LlmError::MissingToolCall(tool_name.to_string()))?;
        let data = serde_json::from_value(input.clone())
            .map_err(|e| LlmError::MalformedOutput(e.to_string()))?;

        Ok(Completion {
            data,
            tokens_used: response.usage.total(),
        })
    }

    fn request(
        &self,
        system: &str,
        user: &str,
        options: CallOptions,
        tool: Option<ToolSpec>,
    ) -> CompletionRequest {
        let user = if options.skip_redaction {
            user.to_string()
        } else {
            redact(user)
        };
        CompletionRequest {
            system: system.to_string(),
            user,
            max_tokens: options.max_tokens.unwrap_or(self.config.default_max_tokens),
            tool,
        }
    }

    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let timeout = self.config.request_timeout;
        let result = self
            .breaker
            .execute(|| {
                retry_with_backoff(
                    &self.config.retry,
                    || async move {
                        match tokio::time::timeout(timeout, self.gateway.complete(request)).await {
                            Ok(result) => result,
                            Err(_) => Err(GatewayError::Timeout),
                        }
                    },
                    GatewayError::is_retryable,
                )
            })
            .await;

        match result {
            Ok(response) => {
                debug!(
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM call completed"
                );
                Ok(response)
            }
            Err(CircuitError::Open(name)) => Err(LlmError::CircuitOpen(name)),
            Err(CircuitError::Inner(e)) => Err(LlmError::RequestFailed {
                attempts: e.attempts,
                source: e.last_error,
            }),
        }
    }
}
