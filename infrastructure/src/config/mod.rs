//! Configuration loading for listing-vetting
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources, plus the TOML agents file used by the local runtime.

mod agents_file;
mod error;
mod file_config;
mod loader;

pub use agents_file::load_agents_file;
pub use error::ConfigError;
pub use file_config::{
    FileCircuitBreakerConfig, FileConfig, FileEmbeddingConfig, FileLlmConfig,
    FileLoggingConfig, FilePipelineConfig, FileRetryConfig, FileWorkerConfig,
};
pub use loader::ConfigLoader;
