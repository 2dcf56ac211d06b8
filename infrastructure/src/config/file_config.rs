//! Raw TOML configuration data types
//!
//! These structs mirror the config file one section per struct. Every field
//! has a default, so an empty file (or none at all) is a valid configuration.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use vetting_application::{
    CircuitBreakerConfig, LlmClientConfig, PipelineParams, RetryPolicy,
};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub llm: FileLlmConfig,
    pub embedding: FileEmbeddingConfig,
    pub pipeline: FilePipelineConfig,
    pub retry: FileRetryConfig,
    pub circuit_breaker: FileCircuitBreakerConfig,
    pub worker: FileWorkerConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::invalid("llm.model", "must not be empty"));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::invalid("llm.max_tokens", "must be positive"));
        }
        if self.llm.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "llm.request_timeout_secs",
                "must be positive",
            ));
        }
        if self.embedding.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "embedding.request_timeout_secs",
                "must be positive",
            ));
        }
        if self.pipeline.token_budget == 0 {
            return Err(ConfigError::invalid("pipeline.token_budget", "must be positive"));
        }
        if self.pipeline.policy_top_k == 0 {
            return Err(ConfigError::invalid("pipeline.policy_top_k", "must be positive"));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::invalid("retry.max_attempts", "must be at least 1"));
        }
        if self.circuit_breaker.window_size == 0 {
            return Err(ConfigError::invalid(
                "circuit_breaker.window_size",
                "must be at least 1",
            ));
        }
        let threshold = self.circuit_breaker.failure_threshold;
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(ConfigError::invalid(
                "circuit_breaker.failure_threshold",
                format!("{threshold} is outside (0, 1)"),
            ));
        }
        if self.circuit_breaker.recovery_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "circuit_breaker.recovery_timeout_secs",
                "must be positive",
            ));
        }
        if self.worker.concurrency == 0 {
            return Err(ConfigError::invalid("worker.concurrency", "must be at least 1"));
        }
        if self.worker.max_deliveries == 0 {
            return Err(ConfigError::invalid(
                "worker.max_deliveries",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn llm_client_config(&self) -> LlmClientConfig {
        LlmClientConfig {
            default_max_tokens: self.llm.max_tokens,
            request_timeout: Duration::from_secs(self.llm.request_timeout_secs),
            retry: self.retry.to_policy(),
        }
    }
}

/// `[llm]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5-20250929".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 1024,
            request_timeout_secs: 60,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
        }
    }
}

impl FileLlmConfig {
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        resolve_secret(&self.api_key_env)
    }
}

/// `[embedding]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEmbeddingConfig {
    pub model: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub api_key_env: String,
}

impl Default for FileEmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            request_timeout_secs: 30,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl FileEmbeddingConfig {
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        resolve_secret(&self.api_key_env)
    }
}

fn resolve_secret(var: &str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingSecret(var.to_string())),
    }
}

/// `[pipeline]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePipelineConfig {
    pub token_budget: u64,
    pub policy_top_k: usize,
    pub explainer_max_tokens: u32,
    pub stale_after_secs: u64,
}

impl Default for FilePipelineConfig {
    fn default() -> Self {
        let params = PipelineParams::default();
        Self {
            token_budget: params.token_budget,
            policy_top_k: params.policy_top_k,
            explainer_max_tokens: params.explainer_max_tokens,
            stale_after_secs: params.stale_after.as_secs(),
        }
    }
}

impl FilePipelineConfig {
    pub fn to_params(&self) -> PipelineParams {
        PipelineParams::default()
            .with_token_budget(self.token_budget)
            .with_policy_top_k(self.policy_top_k)
            .with_explainer_max_tokens(self.explainer_max_tokens)
            .with_stale_after(Duration::from_secs(self.stale_after_secs))
    }
}

/// `[retry]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}

impl FileRetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_base_delay(Duration::from_millis(self.base_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
    }
}

/// `[circuit_breaker]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCircuitBreakerConfig {
    pub window_size: usize,
    pub failure_threshold: f64,
    pub recovery_timeout_secs: u64,
}

impl Default for FileCircuitBreakerConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            failure_threshold: 0.5,
            recovery_timeout_secs: 30,
        }
    }
}

impl FileCircuitBreakerConfig {
    pub fn to_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig::default()
            .with_window_size(self.window_size)
            .with_failure_threshold(self.failure_threshold)
            .with_recovery_timeout(Duration::from_secs(self.recovery_timeout_secs))
    }
}

/// `[worker]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkerConfig {
    pub concurrency: usize,
    pub max_deliveries: u32,
    pub redelivery_delay_ms: u64,
}

impl Default for FileWorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            max_deliveries: 3,
            redelivery_delay_ms: 1000,
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Emit tracing output as JSON
    pub json: bool,
    /// Directory for the daily-rolling log file; stderr only when unset
    pub file_dir: Option<PathBuf>,
    /// JSONL audit log of pipeline runs; disabled when unset
    pub audit_log: Option<PathBuf>,
}
