//! Infrastructure layer for listing-vetting
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer, plus configuration loading.

pub mod config;
pub mod logging;
pub mod memory;
pub mod policy;
pub mod providers;
pub mod queue;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, FileConfig, load_agents_file};
pub use logging::JsonlAuditLogger;
pub use memory::InMemoryStore;
pub use policy::{IngestError, IngestReport, PolicyIngestor};
pub use providers::{
    AnthropicConfig, AnthropicGateway, OpenAiEmbeddingConfig, OpenAiEmbeddingService,
};
pub use queue::{InProcessQueue, InProcessQueueConfig};
