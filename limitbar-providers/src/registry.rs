//! Provider registry.
//!
//! The registry is the single place a provider is wired in: static metadata
//! plus the fetcher constructor. The orchestrator stays closed to
//! modification - adding a provider means adding one arm here.

use limitbar_core::{ProviderKind, ProviderMetadata};
use limitbar_fetch::FetchProvider;
use limitbar_store::Settings;
use std::sync::{Arc, OnceLock};

use crate::anthropic_api::AnthropicBillingApi;
use crate::api_key::ApiKeyFetcher;
use crate::claude::ClaudeApi;
use crate::codex::CodexApi;
use crate::copilot::CopilotApi;
use crate::cursor::CursorApi;
use crate::openai_api::OpenaiBillingApi;
use crate::subscription::SubscriptionFetcher;

// ============================================================================
// Static Registry
// ============================================================================

static METADATA: OnceLock<Vec<ProviderMetadata>> = OnceLock::new();

fn init_metadata() -> Vec<ProviderMetadata> {
    ProviderKind::all()
        .iter()
        .map(|kind| ProviderMetadata::new(*kind))
        .collect()
}

/// Global registry of supported providers.
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// Returns metadata for all providers in default display order.
    pub fn all() -> &'static [ProviderMetadata] {
        METADATA.get_or_init(init_metadata)
    }

    /// Gets metadata for one provider.
    pub fn get(kind: ProviderKind) -> Option<&'static ProviderMetadata> {
        Self::all().iter().find(|m| m.kind == kind)
    }

    /// Looks up a provider by its CLI name / stable id.
    pub fn by_cli_name(name: &str) -> Option<ProviderKind> {
        ProviderKind::from_id(name.trim().to_lowercase().as_str())
    }

    /// Builds the fetcher for one provider.
    pub fn fetcher(kind: ProviderKind) -> Arc<dyn FetchProvider> {
        match kind {
            ProviderKind::Claude => Arc::new(SubscriptionFetcher::new(ClaudeApi)),
            ProviderKind::Codex => Arc::new(SubscriptionFetcher::new(CodexApi)),
            ProviderKind::Copilot => Arc::new(SubscriptionFetcher::new(CopilotApi)),
            ProviderKind::Cursor => Arc::new(SubscriptionFetcher::new(CursorApi)),
            ProviderKind::OpenaiApi => Arc::new(ApiKeyFetcher::new(OpenaiBillingApi)),
            ProviderKind::AnthropicApi => Arc::new(ApiKeyFetcher::new(AnthropicBillingApi)),
        }
    }

    /// Builds fetchers for every provider enabled in the settings, in
    /// configured order. Disabled providers are skipped entirely.
    pub fn enabled_fetchers(settings: &Settings) -> Vec<Arc<dyn FetchProvider>> {
        settings
            .enabled_providers()
            .into_iter()
            .map(Self::fetcher)
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_metadata_and_fetcher() {
        // The metadata table and the fetcher table must never drift apart.
        for kind in ProviderKind::all() {
            let meta = ProviderRegistry::get(*kind);
            assert!(meta.is_some(), "missing metadata for {kind}");

            let fetcher = ProviderRegistry::fetcher(*kind);
            assert_eq!(fetcher.kind(), *kind, "fetcher kind mismatch for {kind}");
        }
    }

    #[test]
    fn test_by_cli_name() {
        assert_eq!(
            ProviderRegistry::by_cli_name("claude"),
            Some(ProviderKind::Claude)
        );
        assert_eq!(
            ProviderRegistry::by_cli_name("  OPENAI-API  "),
            Some(ProviderKind::OpenaiApi)
        );
        assert_eq!(ProviderRegistry::by_cli_name("does-not-exist"), None);
    }

    #[test]
    fn test_enabled_fetchers_follow_settings_order() {
        let settings: Settings = serde_json::from_str(
            r#"{
                "providers": [
                    {"id": "cursor", "enabled": true},
                    {"id": "claude", "enabled": false},
                    {"id": "codex", "enabled": true}
                ],
                "refresh_interval": 300
            }"#,
        )
        .unwrap();

        let fetchers = ProviderRegistry::enabled_fetchers(&settings);
        let kinds: Vec<_> = fetchers.iter().map(|f| f.kind()).collect();
        assert_eq!(kinds, vec![ProviderKind::Cursor, ProviderKind::Codex]);
    }

    #[test]
    fn test_registry_count_matches_kinds() {
        assert_eq!(ProviderRegistry::all().len(), ProviderKind::all().len());
    }
}
