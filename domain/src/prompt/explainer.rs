//! Prompt templates for the decision explainer

use crate::listing::Listing;
use crate::verdict::{AggregatedDecision, SubAgentResult};

/// Templates for explaining an aggregated decision
pub struct ExplainerPromptTemplate;

impl ExplainerPromptTemplate {
    pub fn system() -> &'static str {
        r#"You are a marketplace policy compliance explainer. Given a review decision, the listing details, and the reasoning from individual review agents, write a concise 2-3 sentence explanation of why the listing was approved, rejected, or escalated. Be specific about which policies were relevant. Write for a human reviewer who needs to quickly understand the decision."#
    }

    pub fn user_prompt(
        decision: &AggregatedDecision,
        listing: &Listing,
        results: &[SubAgentResult],
    ) -> String {
        let violations = if decision.violations.is_empty() {
            "None".to_string()
        } else {
            decision
                .violations
                .iter()
                .map(|v| format!("- [{}] {}: {}", v.severity, v.policy_section, v.description))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let agents = results
            .iter()
            .map(|r| {
                format!(
                    "{}: {} (confidence: {:.2}) - {}",
                    r.agent_name, r.verdict, r.confidence, r.reasoning
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"Listing: "{}"
Description: {}
Category: {}

Decision: {} (confidence: {:.2})

Violations:
{}

Agent Analysis:
{}

Write a 2-3 sentence explanation of this decision."#,
            listing.title,
            listing.description,
            listing.category,
            decision.verdict,
            decision.confidence,
            violations,
            agents
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::{AgentViolation, Severity, Verdict};
    use chrono::Utc;

    fn listing() -> Listing {
        Listing {
            id: "l1".into(),
            tenant_id: "t1".into(),
            title: "Hunting rifle".into(),
            description: "Barely used".into(),
            category: "sports".into(),
            image_urls: vec![],
            metadata: Default::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompt_lists_violations_and_agents() {
        let decision = AggregatedDecision {
            verdict: Verdict::Rejected,
            confidence: 0.9,
            violations: vec![AgentViolation::new("1.1", Severity::Critical, "Firearm")],
        };
        let results = vec![
            SubAgentResult::new("prohibited", Verdict::Rejected, 0.9)
                .with_reasoning("Sells a rifle"),
        ];
        let prompt = ExplainerPromptTemplate::user_prompt(&decision, &listing(), &results);

        assert!(prompt.starts_with("Listing: \"Hunting rifle\""));
        assert!(prompt.contains("Decision: rejected (confidence: 0.90)"));
        assert!(prompt.contains("- [critical] 1.1: Firearm"));
        assert!(prompt.contains("prohibited: rejected (confidence: 0.90) - Sells a rifle"));
    }

    #[test]
    fn test_prompt_without_violations() {
        let decision = AggregatedDecision {
            verdict: Verdict::Approved,
            confidence: 0.95,
            violations: vec![],
        };
        let prompt = ExplainerPromptTemplate::user_prompt(&decision, &listing(), &[]);
        assert!(prompt.contains("Violations:\nNone"));
    }
}
