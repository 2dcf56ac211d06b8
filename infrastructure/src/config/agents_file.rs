//! Agents file: per-tenant policy agent definitions in TOML
//!
//! ```toml
//! [[agents]]
//! name = "prohibited"
//! display_name = "Prohibited Items"
//! policy_source_files = ["prohibited-items.md"]
//! system_prompt_template = """
//! You check listings for prohibited items.
//! {{POLICY_CONTEXT}}
//! """
//! ```

use super::error::ConfigError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use vetting_domain::{AgentConfig, AgentPromptTemplate};

#[derive(Debug, Deserialize)]
struct AgentsFile {
    #[serde(default)]
    agents: Vec<FileAgentEntry>,
}

#[derive(Debug, Deserialize)]
struct FileAgentEntry {
    name: String,
    display_name: Option<String>,
    system_prompt_template: Option<String>,
    #[serde(default)]
    policy_source_files: Vec<String>,
    #[serde(default)]
    skip_redaction: bool,
    max_tokens: Option<u32>,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

impl FileAgentEntry {
    fn into_config(self, tenant_id: &str) -> AgentConfig {
        let template = self
            .system_prompt_template
            .unwrap_or_else(|| AgentPromptTemplate::default_system_template().to_string());
        let mut config = AgentConfig::new(
            format!("{tenant_id}:{}", self.name),
            tenant_id,
            self.name,
            template,
        )
        .with_policy_source_files(self.policy_source_files)
        .with_skip_redaction(self.skip_redaction)
        .with_active(self.active);
        if let Some(display_name) = self.display_name {
            config = config.with_display_name(display_name);
        }
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        config
    }
}

/// Read an agents file and bind every entry to `tenant_id`.
pub fn load_agents_file(path: &Path, tenant_id: &str) -> Result<Vec<AgentConfig>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_agents(&content, tenant_id).map_err(|reason| ConfigError::AgentsFile {
        path: path.to_path_buf(),
        reason,
    })
}

fn parse_agents(content: &str, tenant_id: &str) -> Result<Vec<AgentConfig>, String> {
    let file: AgentsFile = toml::from_str(content).map_err(|e| e.to_string())?;

    let mut seen = HashSet::new();
    let mut configs = Vec::with_capacity(file.agents.len());
    for entry in file.agents {
        if !seen.insert(entry.name.clone()) {
            return Err(format!("duplicate agent name '{}'", entry.name));
        }
        let config = entry.into_config(tenant_id);
        config.validate().map_err(|e| e.to_string())?;
        configs.push(config);
    }
    Ok(configs)
}
