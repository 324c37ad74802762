//! JSON output formatting for scripting.

use anyhow::Result;
use limitbar_core::ProviderResult;

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a formatter; `pretty` controls indentation.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Serializes the ordered result list.
    ///
    /// The schema is stable: one entry per enabled provider with `provider`,
    /// `status`, `usage`, `error`, and `fetched_at`.
    pub fn format(&self, results: &[ProviderResult]) -> Result<String> {
        let output = if self.pretty {
            serde_json::to_string_pretty(results)?
        } else {
            serde_json::to_string(results)?
        };
        Ok(output)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use limitbar_core::{ProviderKind, SpendUsage, UsagePayload};

    #[test]
    fn test_format_schema() {
        let results = vec![
            ProviderResult::ok(
                ProviderKind::OpenaiApi,
                UsagePayload::Spend(SpendUsage {
                    spent_usd: 12.5,
                    budget_usd: Some(50.0),
                }),
            ),
            ProviderResult::unauthenticated(ProviderKind::Claude),
        ];

        let output = JsonFormatter::new(false).format(&results).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0]["provider"], "openai-api");
        assert_eq!(entries[0]["status"], "ok");
        assert_eq!(entries[0]["usage"]["kind"], "spend");
        assert_eq!(entries[0]["usage"]["spent_usd"], 12.5);

        assert_eq!(entries[1]["provider"], "claude");
        assert_eq!(entries[1]["status"], "unauthenticated");
        assert!(entries[1]["error"].as_str().unwrap().contains("--login"));
    }

    #[test]
    fn test_pretty_output_is_indented() {
        let results = vec![ProviderResult::unauthenticated(ProviderKind::Codex)];
        let output = JsonFormatter::new(true).format(&results).unwrap();
        assert!(output.contains('\n'));
    }
}
