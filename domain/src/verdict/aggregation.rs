//! Decision fusion over agent results
//!
//! Both thresholds are exclusive: a tie at the boundary escalates.

use super::types::{AgentViolation, SubAgentResult, Verdict};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A rejection only counts when its confidence is strictly above this.
pub const REJECTION_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Unanimous approval only wins when the mean confidence is strictly above this.
pub const APPROVAL_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// The fused decision for one review run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedDecision {
    pub verdict: Verdict,
    pub confidence: f64,
    /// Violations deduplicated by policy section
    pub violations: Vec<AgentViolation>,
}

impl AggregatedDecision {
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}

/// Fuse agent results into a single decision.
///
/// Requires at least one result; an empty slice means every agent failed and
/// is reported as [`DomainError::NoAgentResults`].
///
/// # Example
///
/// ```
/// use vetting_domain::verdict::{SubAgentResult, Verdict, aggregate};
///
/// let results = vec![
///     SubAgentResult::new("prohibited", Verdict::Approved, 0.95),
///     SubAgentResult::new("disintermediation", Verdict::Approved, 0.90),
///     SubAgentResult::new("health-claims", Verdict::Approved, 0.85),
/// ];
/// let decision = aggregate(&results).unwrap();
/// assert_eq!(decision.verdict, Verdict::Approved);
/// assert!((decision.confidence - 0.90).abs() < 1e-9);
/// ```
pub fn aggregate(results: &[SubAgentResult]) -> Result<AggregatedDecision, DomainError> {
    if results.is_empty() {
        return Err(DomainError::NoAgentResults);
    }

    let violations = merge_violations(results);

    let rejections: Vec<f64> = results
        .iter()
        .filter(|r| r.verdict == Verdict::Rejected && r.confidence > REJECTION_CONFIDENCE_THRESHOLD)
        .map(|r| r.confidence)
        .collect();

    if !rejections.is_empty() {
        return Ok(AggregatedDecision {
            verdict: Verdict::Rejected,
            confidence: mean(&rejections),
            violations,
        });
    }

    let all: Vec<f64> = results.iter().map(|r| r.confidence).collect();
    let avg = mean(&all);
    let unanimous = results.iter().all(|r| r.verdict == Verdict::Approved);

    let verdict = if unanimous && avg > APPROVAL_CONFIDENCE_THRESHOLD {
        Verdict::Approved
    } else {
        Verdict::Escalated
    };

    Ok(AggregatedDecision {
        verdict,
        confidence: avg,
        violations,
    })
}

/// Merge violations across results, one per policy section.
///
/// On collision the more severe instance wins; on equal severity the first
/// one seen is kept. Output order follows first appearance of each section.
pub fn merge_violations(results: &[SubAgentResult]) -> Vec<AgentViolation> {
    let mut merged: Vec<AgentViolation> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for violation in results.iter().flat_map(|r| r.violations.iter()) {
        match index.get(&violation.policy_section) {
            Some(&i) => {
                if violation.severity > merged[i].severity {
                    merged[i] = violation.clone();
                }
            }
            None => {
                index.insert(violation.policy_section.clone(), merged.len());
                merged.push(violation.clone());
            }
        }
    }

    merged
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::types::Severity;

    fn result(name: &str, verdict: Verdict, confidence: f64) -> SubAgentResult {
        SubAgentResult::new(name, verdict, confidence)
    }

    #[test]
    fn test_unanimous_confident_approval() {
        let results = vec![
            result("a", Verdict::Approved, 0.95),
            result("b", Verdict::Approved, 0.90),
            result("c", Verdict::Approved, 0.85),
        ];
        let decision = aggregate(&results).unwrap();
        assert_eq!(decision.verdict, Verdict::Approved);
        assert!((decision.confidence - 0.90).abs() < 1e-9);
        assert!(decision.violations.is_empty());
    }

    #[test]
    fn test_confident_rejection_wins() {
        let results = vec![
            result("a", Verdict::Approved, 0.95),
            result("b", Verdict::Rejected, 0.85).with_violation(AgentViolation::new(
                "1.1",
                Severity::High,
                "Firearm listed",
            )),
        ];
        let decision = aggregate(&results).unwrap();
        assert_eq!(decision.verdict, Verdict::Rejected);
        assert!((decision.confidence - 0.85).abs() < 1e-9);
        assert_eq!(decision.violations.len(), 1);
        assert_eq!(decision.violations[0].policy_section, "1.1");
    }

    #[test]
    fn test_rejection_confidence_averages_only_qualifying() {
        let results = vec![
            result("a", Verdict::Rejected, 0.9),
            result("b", Verdict::Rejected, 0.8),
            result("c", Verdict::Rejected, 0.5),
            result("d", Verdict::Approved, 0.99),
        ];
        let decision = aggregate(&results).unwrap();
        assert_eq!(decision.verdict, Verdict::Rejected);
        assert!((decision.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_rejection_at_boundary_escalates() {
        let results = vec![
            result("a", Verdict::Approved, 0.9),
            result("b", Verdict::Rejected, 0.70),
        ];
        let decision = aggregate(&results).unwrap();
        assert_eq!(decision.verdict, Verdict::Escalated);
        assert!((decision.confidence - 0.80).abs() < 1e-9);
    }

    #[test]
    fn test_approval_mean_at_boundary_escalates() {
        let results = vec![
            result("a", Verdict::Approved, 0.80),
            result("b", Verdict::Approved, 0.80),
        ];
        let decision = aggregate(&results).unwrap();
        assert_eq!(decision.verdict, Verdict::Escalated);
    }

    #[test]
    fn test_escalated_agent_blocks_approval() {
        let results = vec![
            result("a", Verdict::Approved, 0.99),
            result("b", Verdict::Escalated, 0.95),
        ];
        let decision = aggregate(&results).unwrap();
        assert_eq!(decision.verdict, Verdict::Escalated);
        assert!((decision.confidence - 0.97).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_section_keeps_highest_severity() {
        let results = vec![
            result("a", Verdict::Escalated, 0.6).with_violation(AgentViolation::new(
                "2.3",
                Severity::Medium,
                "Off-platform contact hinted",
            )),
            result("b", Verdict::Escalated, 0.6).with_violation(AgentViolation::new(
                "2.3",
                Severity::Critical,
                "Phone number in description",
            )),
        ];
        let decision = aggregate(&results).unwrap();
        assert_eq!(decision.violations.len(), 1);
        assert_eq!(decision.violations[0].severity, Severity::Critical);
        assert_eq!(
            decision.violations[0].description,
            "Phone number in description"
        );
    }

    #[test]
    fn test_merge_preserves_first_appearance_order() {
        let results = vec![
            result("a", Verdict::Rejected, 0.9)
                .with_violation(AgentViolation::new("3.1", Severity::Low, "x"))
                .with_violation(AgentViolation::new("1.2", Severity::High, "y")),
            result("b", Verdict::Rejected, 0.9)
                .with_violation(AgentViolation::new("3.1", Severity::Low, "z")),
        ];
        let merged = merge_violations(&results);
        let sections: Vec<&str> = merged.iter().map(|v| v.policy_section.as_str()).collect();
        assert_eq!(sections, vec!["3.1", "1.2"]);
        // equal severity keeps the first instance
        assert_eq!(merged[0].description, "x");
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let results = vec![
            result("a", Verdict::Rejected, 0.75)
                .with_violation(AgentViolation::new("1.1", Severity::High, "a")),
            result("b", Verdict::Approved, 0.9)
                .with_violation(AgentViolation::new("4.0", Severity::Low, "b")),
        ];
        assert_eq!(aggregate(&results).unwrap(), aggregate(&results).unwrap());
    }

    #[test]
    fn test_empty_results_is_an_error() {
        assert_eq!(aggregate(&[]), Err(DomainError::NoAgentResults));
    }
}
