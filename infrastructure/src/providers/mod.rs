//! Remote service adapters
//!
//! - [`AnthropicGateway`]: the [`LlmGateway`](vetting_application::LlmGateway) over the Messages API
//! - [`OpenAiEmbeddingService`]: the [`EmbeddingService`](vetting_application::EmbeddingService)
//!   over any OpenAI-compatible `/embeddings` endpoint

pub mod anthropic;
pub mod openai_embedding;

pub use anthropic::{AnthropicConfig, AnthropicGateway};
pub use openai_embedding::{OpenAiEmbeddingConfig, OpenAiEmbeddingService};

/// Mask an API key for display, keeping the first and last four characters.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("sk-ant-REDACTED"), "sk-a...ghij");
        assert_eq!(mask_api_key("short"), "*****");
        assert_eq!(mask_api_key(""), "");
    }
}
