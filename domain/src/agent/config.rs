//! Agent configuration

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Per-agent call options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentOptions {
    /// Send the listing text to the model without PII redaction
    pub skip_redaction: bool,
    /// Overrides the client's default completion ceiling
    pub max_tokens: Option<u32>,
}

/// Configuration of one policy agent for a tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: String,
    pub tenant_id: String,
    /// Unique per tenant; also determines the tool name
    pub name: String,
    pub display_name: String,
    /// May contain a single `{{POLICY_CONTEXT}}` marker
    pub system_prompt_template: String,
    /// Restricts policy retrieval to these source files; empty means all
    #[serde(default)]
    pub policy_source_files: Vec<String>,
    #[serde(default)]
    pub options: AgentOptions,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl AgentConfig {
    pub fn new(
        id: impl Into<String>,
        tenant_id: impl Into<String>,
        name: impl Into<String>,
        system_prompt_template: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            display_name: name.clone(),
            name,
            system_prompt_template: system_prompt_template.into(),
            policy_source_files: Vec::new(),
            options: AgentOptions::default(),
            active: true,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_policy_source_files(mut self, files: Vec<String>) -> Self {
        self.policy_source_files = files;
        self
    }

    pub fn with_skip_redaction(mut self, skip: bool) -> Self {
        self.options.skip_redaction = skip;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    // ==================== Validation ====================

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidAgentConfig(
                "agent name must not be empty".into(),
            ));
        }
        if self.tenant_id.trim().is_empty() {
            return Err(DomainError::InvalidAgentConfig(format!(
                "agent '{}' has no tenant",
                self.name
            )));
        }
        if self.system_prompt_template.trim().is_empty() {
            return Err(DomainError::InvalidAgentConfig(format!(
                "agent '{}' has an empty system prompt",
                self.name
            )));
        }
        if self.options.max_tokens == Some(0) {
            return Err(DomainError::InvalidAgentConfig(format!(
                "agent '{}' has max_tokens = 0",
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = AgentConfig::new("a1", "t1", "health-claims", "You review health claims.")
            .with_display_name("Health Claims")
            .with_policy_source_files(vec!["health.md".into()])
            .with_skip_redaction(true)
            .with_max_tokens(512);

        assert_eq!(config.display_name, "Health Claims");
        assert!(config.options.skip_redaction);
        assert_eq!(config.options.max_tokens, Some(512));
        assert!(config.active);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let config = AgentConfig::new("a1", "t1", "  ", "prompt");
        assert!(matches!(
            config.validate(),
            Err(DomainError::InvalidAgentConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_max_tokens() {
        let config = AgentConfig::new("a1", "t1", "prohibited", "prompt").with_max_tokens(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = serde_json::json!({
            "id": "a1",
            "tenant_id": "t1",
            "name": "prohibited",
            "display_name": "Prohibited Items",
            "system_prompt_template": "Check {{POLICY_CONTEXT}}"
        });
        let config: AgentConfig = serde_json::from_value(json).unwrap();
        assert!(config.active);
        assert!(config.policy_source_files.is_empty());
        assert_eq!(config.options, AgentOptions::default());
    }
}
