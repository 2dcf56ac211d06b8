//! LLM Gateway port
//!
//! Defines the interface for communicating with a remote completion service.
//! One request carries a system prompt, a single user turn, and optionally one
//! tool the model is forced to call.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Timeout")]
    Timeout,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Client errors other than rate limiting are not worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Api { status, .. } => !(400..500).contains(status) || *status == 429,
            GatewayError::Timeout
            | GatewayError::Connection(_)
            | GatewayError::InvalidResponse(_) => true,
        }
    }
}

/// A tool the model must answer through
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    /// When set, the model is forced to call this tool
    pub tool: Option<ToolSpec>,
}

/// One block of model output
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(String),
    ToolUse { name: String, input: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub content: Vec<ContentBlock>,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// First text block, if any
    pub fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text(text) => Some(text.as_str()),
            ContentBlock::ToolUse { .. } => None,
        })
    }

    /// Input of the first call to `tool_name`, if any
    pub fn tool_input(&self, tool_name: &str) -> Option<&Value> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::ToolUse { name, input } if name == tool_name => Some(input),
            _ => None,
        })
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer communicates with LLM providers.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send one request and wait for the full response
    async fn complete(&self, request: &CompletionRequest)
    -> Result<CompletionResponse, GatewayError>;
}
