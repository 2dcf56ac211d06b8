//! Dispatch plans produced by policy routing

use super::config::AgentConfig;
use crate::policy::PolicyMatch;
use serde::{Deserialize, Serialize};

/// One agent paired with the policy text retrieved for it in a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDispatchPlan {
    pub config: AgentConfig,
    pub policies: Vec<PolicyMatch>,
}

impl AgentDispatchPlan {
    pub fn new(config: AgentConfig, policies: Vec<PolicyMatch>) -> Self {
        Self { config, policies }
    }

    pub fn agent_name(&self) -> &str {
        &self.config.name
    }
}
