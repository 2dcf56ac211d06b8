//! Policy entities

use serde::{Deserialize, Serialize};

/// A window of policy text (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyChunk {
    pub source_file: String,
    pub chunk_index: usize,
    pub content: String,
    /// Markdown headings found inside the chunk
    #[serde(default)]
    pub sections: Vec<String>,
    /// Filled in by ingestion
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl PolicyChunk {
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }
}

/// A ranked retrieval result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyMatch {
    pub source_file: String,
    pub content: String,
    /// Higher is more relevant
    pub similarity: f32,
}

impl PolicyMatch {
    pub fn new(
        source_file: impl Into<String>,
        content: impl Into<String>,
        similarity: f32,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            content: content.into(),
            similarity,
        }
    }

    /// `[source_file] content`, the form agents see in their system prompt.
    pub fn as_context(&self) -> String {
        format!("[{}] {}", self.source_file, self.content)
    }
}
