//! Output formatting.

pub mod json;
pub mod text;

use limitbar_core::{ProviderKind, ProviderResult};
use limitbar_store::Settings;
use std::collections::HashMap;

pub use json::JsonFormatter;
pub use text::TextFormatter;

/// Orders cycle results by the settings' provider order.
///
/// The orchestrator keys results by provider id with no ordering guarantee;
/// display order belongs to the settings.
pub fn ordered_results(
    results: &HashMap<ProviderKind, ProviderResult>,
    settings: &Settings,
) -> Vec<ProviderResult> {
    settings
        .enabled_providers()
        .into_iter()
        .filter_map(|kind| results.get(&kind).cloned())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_results_follow_settings() {
        let settings: Settings = serde_json::from_str(
            r#"{
                "providers": [
                    {"id": "codex", "enabled": true},
                    {"id": "claude", "enabled": true}
                ],
                "refresh_interval": 300
            }"#,
        )
        .unwrap();

        let mut results = HashMap::new();
        results.insert(
            ProviderKind::Claude,
            ProviderResult::unauthenticated(ProviderKind::Claude),
        );
        results.insert(
            ProviderKind::Codex,
            ProviderResult::unauthenticated(ProviderKind::Codex),
        );

        let ordered = ordered_results(&results, &settings);
        let kinds: Vec<_> = ordered.iter().map(|r| r.provider).collect();
        assert_eq!(kinds, vec![ProviderKind::Codex, ProviderKind::Claude]);
    }
}
