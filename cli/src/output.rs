//! Rendering of a finished review

use std::fmt::Write;
use vetting_application::ReviewStatusView;

pub struct ReviewFormatter;

impl ReviewFormatter {
    pub fn format_text(view: &ReviewStatusView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Review:      {}", view.review_id);
        let _ = writeln!(out, "Status:      {}", view.status);
        match (view.verdict, view.confidence) {
            (Some(verdict), Some(confidence)) => {
                let _ = writeln!(out, "Verdict:     {verdict} (confidence: {confidence:.2})");
            }
            _ => {
                let _ = writeln!(out, "Verdict:     none");
            }
        }
        if let Some(explanation) = &view.explanation {
            let _ = writeln!(out, "Explanation: {explanation}");
        }

        let _ = writeln!(out);
        if view.violations.is_empty() {
            let _ = writeln!(out, "Violations:  none");
        } else {
            let _ = writeln!(out, "Violations:");
            for v in &view.violations {
                let _ = writeln!(
                    out,
                    "  - [{}] {}: {}",
                    v.severity, v.policy_section, v.description
                );
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Trace:");
        for node in &view.trace.nodes {
            let marker = if node.succeeded() { "ok" } else { "FAILED" };
            let _ = writeln!(
                out,
                "  {:<12} {:>7} ms  {}",
                node.stage.as_str(),
                node.duration_ms,
                marker
            );
        }
        let _ = writeln!(
            out,
            "  {:<12} {:>7} ms",
            "total",
            view.trace.total_duration_ms()
        );
        if let Some(error) = &view.trace.error {
            let _ = writeln!(out, "  error: {error}");
        }
        let _ = write!(out, "Tokens used: {}", view.trace.tokens_used);
        out
    }

    pub fn format_json(view: &ReviewStatusView) -> String {
        serde_json::to_string_pretty(view).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}
