//! Review entities

use super::trace::ReviewTrace;
use crate::verdict::{AgentViolation, Verdict};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Status of a review run
///
/// Separate from [`Verdict`]: a review with status `Complete` may carry any
/// verdict, and status `Escalated` is only reached through
/// [`ReviewStatus::terminal_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Routing,
    Scanning,
    Aggregating,
    Complete,
    Escalated,
    Failed,
}

impl ReviewStatus {
    /// Terminal status for a decided verdict.
    pub fn terminal_for(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Escalated => ReviewStatus::Escalated,
            Verdict::Approved | Verdict::Rejected => ReviewStatus::Complete,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReviewStatus::Complete | ReviewStatus::Escalated | ReviewStatus::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Routing => "routing",
            ReviewStatus::Scanning => "scanning",
            ReviewStatus::Aggregating => "aggregating",
            ReviewStatus::Complete => "complete",
            ReviewStatus::Escalated => "escalated",
            ReviewStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReviewStatus::Pending),
            "routing" => Ok(ReviewStatus::Routing),
            "scanning" => Ok(ReviewStatus::Scanning),
            "aggregating" => Ok(ReviewStatus::Aggregating),
            "complete" => Ok(ReviewStatus::Complete),
            "escalated" => Ok(ReviewStatus::Escalated),
            "failed" => Ok(ReviewStatus::Failed),
            other => Err(format!("unknown review status: {other}")),
        }
    }
}

/// A review of one listing (Entity)
///
/// `verdict`, `confidence` and `explanation` are either all unset or all set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub listing_id: String,
    pub status: ReviewStatus,
    pub verdict: Option<Verdict>,
    pub confidence: Option<f64>,
    pub explanation: Option<String>,
    #[serde(default)]
    pub trace: ReviewTrace,
    #[serde(default)]
    pub violations: Vec<AgentViolation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// A fresh review awaiting its first run.
    pub fn pending(
        id: impl Into<String>,
        listing_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            listing_id: listing_id.into(),
            status: ReviewStatus::Pending,
            verdict: None,
            confidence: None,
            explanation: None,
            trace: ReviewTrace::default(),
            violations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Still `pending` after the staleness window, i.e. the job was probably lost.
    pub fn is_stuck(&self, now: DateTime<Utc>, stale_after: Duration) -> bool {
        self.status == ReviewStatus::Pending && now - self.created_at > stale_after
    }
}

/// Queue payload identifying one review run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewJob {
    pub review_id: String,
    pub listing_id: String,
    pub tenant_id: String,
}

impl ReviewJob {
    pub fn new(
        review_id: impl Into<String>,
        listing_id: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            review_id: review_id.into(),
            listing_id: listing_id.into(),
            tenant_id: tenant_id.into(),
        }
    }
}
