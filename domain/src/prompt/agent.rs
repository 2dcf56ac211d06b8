//! Prompt templates for policy agents

use crate::listing::Listing;
use crate::policy::PolicyMatch;
use serde_json::{Value, json};

/// Marker in a system prompt template that receives the retrieved policy text
pub const POLICY_PLACEHOLDER: &str = "{{POLICY_CONTEXT}}";

/// Policy context used when retrieval returned nothing
pub const NO_POLICIES_MESSAGE: &str = "No specific policies loaded.";

/// Templates for generating agent prompts
pub struct AgentPromptTemplate;

impl AgentPromptTemplate {
    /// Fallback system prompt for agents configured without one
    pub fn default_system_template() -> &'static str {
        r#"You are a marketplace policy compliance agent.

Analyze the listing against the policies below and decide whether it complies.

Policies:
{{POLICY_CONTEXT}}

Return your analysis as a structured result with verdict, confidence (0-1), any violations found, and reasoning.
- "rejected" if clear policy violation with high confidence
- "escalated" if suspicious but uncertain
- "approved" if no violation detected"#
    }

    /// Retrieved policies as `[source] content` blocks separated by blank lines.
    pub fn policy_context(policies: &[PolicyMatch]) -> String {
        if policies.is_empty() {
            return NO_POLICIES_MESSAGE.to_string();
        }
        policies
            .iter()
            .map(PolicyMatch::as_context)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Fill the policy marker, or append a policies section when the template
    /// has none.
    pub fn resolve_system_prompt(template: &str, policies: &[PolicyMatch]) -> String {
        let context = Self::policy_context(policies);
        if template.contains(POLICY_PLACEHOLDER) {
            template.replacen(POLICY_PLACEHOLDER, &context, 1)
        } else {
            format!("{template}\n\nRelevant Policies:\n{context}")
        }
    }

    /// `submit_<name>_analysis` with hyphens turned into underscores.
    pub fn tool_name(agent_name: &str) -> String {
        format!("submit_{}_analysis", agent_name.replace('-', "_"))
    }

    pub fn tool_description() -> &'static str {
        "Submit the structured analysis result"
    }

    /// User prompt for one listing
    pub fn user_prompt(listing: &Listing) -> String {
        format!(
            "Listing Title: {}\nDescription: {}\nCategory: {}",
            listing.title, listing.description, listing.category
        )
    }

    /// JSON schema the model's tool input must follow
    pub fn result_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "verdict": {
                    "type": "string",
                    "enum": ["approved", "rejected", "escalated"]
                },
                "confidence": {
                    "type": "number",
                    "minimum": 0,
                    "maximum": 1
                },
                "violations": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "policySection": { "type": "string" },
                            "severity": {
                                "type": "string",
                                "enum": ["low", "medium", "high", "critical"]
                            },
                            "description": { "type": "string" }
                        },
                        "required": ["policySection", "severity", "description"]
                    }
                },
                "reasoning": { "type": "string" }
            },
            "required": ["verdict", "confidence", "violations", "reasoning"]
        })
    }
}
