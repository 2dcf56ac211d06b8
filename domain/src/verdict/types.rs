//! Verdict value objects

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Outcome of a compliance check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Approved,
    Rejected,
    /// Needs a human reviewer
    Escalated,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approved => "approved",
            Verdict::Rejected => "rejected",
            Verdict::Escalated => "escalated",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approved" => Ok(Verdict::Approved),
            "rejected" => Ok(Verdict::Rejected),
            "escalated" => Ok(Verdict::Escalated),
            other => Err(format!("unknown verdict: {other}")),
        }
    }
}

/// Violation severity, totally ordered from `Low` to `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single policy violation reported by an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentViolation {
    /// Policy section identifier, e.g. "1.1"
    pub policy_section: String,
    pub severity: Severity,
    pub description: String,
}

impl AgentViolation {
    pub fn new(
        policy_section: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            policy_section: policy_section.into(),
            severity,
            description: description.into(),
        }
    }
}

/// Result of one successfully executed policy agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAgentResult {
    pub agent_name: String,
    pub verdict: Verdict,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    pub violations: Vec<AgentViolation>,
    pub reasoning: String,
}

impl SubAgentResult {
    pub fn new(agent_name: impl Into<String>, verdict: Verdict, confidence: f64) -> Self {
        Self {
            agent_name: agent_name.into(),
            verdict,
            confidence,
            violations: Vec::new(),
            reasoning: String::new(),
        }
    }

    pub fn with_violation(mut self, violation: AgentViolation) -> Self {
        self.violations.push(violation);
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }
}

/// Structured payload a model submits for one agent.
///
/// Mirrors the JSON schema handed to the model; the agent name is never taken
/// from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentFindings {
    pub verdict: Verdict,
    pub confidence: f64,
    #[serde(default)]
    pub violations: Vec<AgentViolation>,
    pub reasoning: String,
}

impl AgentFindings {
    /// Check the payload against the bounds the schema promises.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(DomainError::InvalidAgentResult(format!(
                "confidence out of range: {}",
                self.confidence
            )));
        }
        if self
            .violations
            .iter()
            .any(|v| v.policy_section.trim().is_empty())
        {
            return Err(DomainError::InvalidAgentResult(
                "violation without policy section".to_string(),
            ));
        }
        Ok(())
    }

    /// Attach the configured agent name.
    pub fn into_result(self, agent_name: impl Into<String>) -> SubAgentResult {
        SubAgentResult {
            agent_name: agent_name.into(),
            verdict: self.verdict,
            confidence: self.confidence,
            violations: self.violations,
            reasoning: self.reasoning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_total_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(
            [Severity::Medium, Severity::Critical, Severity::Low].iter().max(),
            Some(&Severity::Critical)
        );
    }

    #[test]
    fn test_verdict_serde_lowercase() {
        let json = serde_json::to_string(&Verdict::Escalated).unwrap();
        assert_eq!(json, "\"escalated\"");
        let parsed: Verdict = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(parsed, Verdict::Rejected);
    }

    #[test]
    fn test_verdict_from_str() {
        assert_eq!("Approved".parse::<Verdict>(), Ok(Verdict::Approved));
        assert!("maybe".parse::<Verdict>().is_err());
    }

    #[test]
    fn test_findings_deserialize_from_model_payload() {
        let payload = serde_json::json!({
            "verdict": "rejected",
            "confidence": 0.9,
            "violations": [
                {"policySection": "1.1", "severity": "high", "description": "Firearm"}
            ],
            "reasoning": "Listing sells a handgun"
        });
        let findings: AgentFindings = serde_json::from_value(payload).unwrap();
        assert!(findings.validate().is_ok());

        let result = findings.into_result("prohibited");
        assert_eq!(result.agent_name, "prohibited");
        assert_eq!(result.violations[0].severity, Severity::High);
    }

    #[test]
    fn test_findings_confidence_out_of_range() {
        let findings = AgentFindings {
            verdict: Verdict::Approved,
            confidence: 1.2,
            violations: vec![],
            reasoning: String::new(),
        };
        assert!(matches!(
            findings.validate(),
            Err(DomainError::InvalidAgentResult(_))
        ));

        let nan = AgentFindings {
            confidence: f64::NAN,
            ..findings
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_findings_reject_blank_section() {
        let findings = AgentFindings {
            verdict: Verdict::Rejected,
            confidence: 0.8,
            violations: vec![AgentViolation::new(" ", Severity::Low, "x")],
            reasoning: String::new(),
        };
        assert!(findings.validate().is_err());
    }
}
