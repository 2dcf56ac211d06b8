//! Embedding service port

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    #[error("Embedding API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding connection error: {0}")]
    Connection(String),

    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),
}

/// Turns text into vectors for similarity search.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// One vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}
