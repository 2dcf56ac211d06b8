//! Execution trace of a review run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pipeline stage names recorded in a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Routing,
    Scanning,
    Aggregating,
    Explaining,
    Persist,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Routing => "routing",
            Stage::Scanning => "scanning",
            Stage::Aggregating => "aggregating",
            Stage::Explaining => "explaining",
            Stage::Persist => "persist",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One executed stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTrace {
    pub stage: Stage,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NodeTrace {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Append-only trace for one run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReviewTrace {
    pub nodes: Vec<NodeTrace>,
    /// Run-level error, set when the run failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub tokens_used: u64,
}

impl ReviewTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeTrace) {
        self.nodes.push(node);
    }

    pub fn failed_with(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.nodes.iter().map(|n| n.duration_ms).sum()
    }

    /// The first stage that recorded an error.
    pub fn failed_stage(&self) -> Option<Stage> {
        self.nodes.iter().find(|n| n.error.is_some()).map(|n| n.stage)
    }
}
