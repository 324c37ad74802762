//! Shared lifecycle for API-key billing providers.
//!
//! An API-key provider resolves its key from the settings override first,
//! then the primary environment variable, then the fallback variable. With
//! no key it reports `unauthenticated`; with one it fetches month-to-date
//! spend and pairs it with the configured monthly budget. There is no
//! refresh step for this variant.

use async_trait::async_trait;
use limitbar_core::{ProviderKind, ProviderResult, SpendUsage, UsagePayload};
use limitbar_fetch::{FetchContext, FetchError, FetchProvider};
use tracing::debug;

// ============================================================================
// Billing API
// ============================================================================

/// Provider-specific pieces of the API-key lifecycle.
#[async_trait]
pub trait BillingApi: Send + Sync {
    /// The provider this API serves.
    fn kind(&self) -> ProviderKind;

    /// Primary and fallback environment variables for the key.
    fn env_vars(&self) -> (&'static str, &'static str);

    /// Fetches month-to-date spend in USD.
    async fn fetch_spend(&self, ctx: &FetchContext, key: &str) -> Result<f64, FetchError>;
}

// ============================================================================
// API-Key Fetcher
// ============================================================================

/// [`FetchProvider`] adapter wrapping a [`BillingApi`].
pub struct ApiKeyFetcher<A> {
    api: A,
}

impl<A: BillingApi> ApiKeyFetcher<A> {
    /// Wraps a billing API in the shared lifecycle.
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Resolves the key: settings override wins over environment variables.
    fn resolve_key(&self, ctx: &FetchContext) -> Option<String> {
        if let Some(key) = ctx.settings.api_key(self.api.kind()) {
            debug!(provider = %self.api.kind(), source = "settings", "Resolved API key");
            return Some(key.to_string());
        }

        let (primary, fallback) = self.api.env_vars();
        [primary, fallback]
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|k| !k.is_empty()))
    }
}

#[async_trait]
impl<A: BillingApi> FetchProvider for ApiKeyFetcher<A> {
    fn kind(&self) -> ProviderKind {
        self.api.kind()
    }

    async fn fetch(&self, ctx: &FetchContext) -> ProviderResult {
        let kind = self.api.kind();

        let Some(key) = self.resolve_key(ctx) else {
            debug!(provider = %kind, "No API key resolvable");
            return ProviderResult::unauthenticated(kind);
        };

        match self.api.fetch_spend(ctx, &key).await {
            Ok(spent_usd) => {
                let payload = UsagePayload::Spend(SpendUsage {
                    spent_usd,
                    budget_usd: ctx.settings.monthly_budget(kind),
                });
                ProviderResult::ok(kind, payload)
            }
            Err(e) if e.is_auth() => ProviderResult::unauthenticated(kind),
            Err(e) => ProviderResult::error(kind, e.to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use limitbar_core::FetchStatus;
    use limitbar_store::{AuthStore, Settings};
    use std::sync::Arc;
    use std::time::Duration;

    struct FakeBilling {
        spend: Result<f64, ()>,
        auth_rejected: bool,
    }

    #[async_trait]
    impl BillingApi for FakeBilling {
        fn kind(&self) -> ProviderKind {
            ProviderKind::OpenaiApi
        }

        fn env_vars(&self) -> (&'static str, &'static str) {
            // Names no real environment would set.
            ("LIMITBAR_TEST_PRIMARY_KEY", "LIMITBAR_TEST_FALLBACK_KEY")
        }

        async fn fetch_spend(&self, _ctx: &FetchContext, key: &str) -> Result<f64, FetchError> {
            assert!(!key.is_empty());
            if self.auth_rejected {
                return Err(FetchError::Unauthenticated);
            }
            self.spend
                .map_err(|()| FetchError::InvalidResponse("bad payload".to_string()))
        }
    }

    fn ctx_with_settings(settings: Settings) -> (tempfile::TempDir, FetchContext) {
        let dir = tempfile::tempdir().unwrap();
        let ctx = FetchContext::builder()
            .auth(Arc::new(AuthStore::new(dir.path().join("auth.json"))))
            .settings(settings)
            .timeout(Duration::from_secs(5))
            .build();
        (dir, ctx)
    }

    fn settings_with_key_and_budget(budget: Option<f64>) -> Settings {
        let json = serde_json::json!({
            "providers": [
                {"id": "openai-api", "enabled": true, "api_key": "sk-admin-test", "monthly_budget": budget}
            ],
            "refresh_interval": 90
        });
        serde_json::from_value(json).unwrap()
    }

    #[tokio::test]
    async fn test_no_key_is_unauthenticated() {
        let (_dir, ctx) = ctx_with_settings(Settings::default());
        let fetcher = ApiKeyFetcher::new(FakeBilling {
            spend: Ok(1.0),
            auth_rejected: false,
        });

        let result = fetcher.fetch(&ctx).await;
        assert_eq!(result.status, FetchStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_spend_with_budget_computes_fraction() {
        let (_dir, ctx) = ctx_with_settings(settings_with_key_and_budget(Some(50.0)));
        let fetcher = ApiKeyFetcher::new(FakeBilling {
            spend: Ok(12.5),
            auth_rejected: false,
        });

        let result = fetcher.fetch(&ctx).await;
        assert!(result.is_ok());
        match result.usage.unwrap() {
            UsagePayload::Spend(spend) => {
                assert_eq!(spend.spent_usd, 12.5);
                assert_eq!(spend.budget_usd, Some(50.0));
                assert_eq!(spend.budget_fraction(), Some(0.25));
            }
            UsagePayload::Subscription { .. } => panic!("wrong payload kind"),
        }
    }

    #[tokio::test]
    async fn test_spend_without_budget() {
        let (_dir, ctx) = ctx_with_settings(settings_with_key_and_budget(None));
        let fetcher = ApiKeyFetcher::new(FakeBilling {
            spend: Ok(3.0),
            auth_rejected: false,
        });

        let result = fetcher.fetch(&ctx).await;
        match result.usage.unwrap() {
            UsagePayload::Spend(spend) => assert_eq!(spend.budget_fraction(), None),
            UsagePayload::Subscription { .. } => panic!("wrong payload kind"),
        }
    }

    #[tokio::test]
    async fn test_rejected_key_is_unauthenticated() {
        let (_dir, ctx) = ctx_with_settings(settings_with_key_and_budget(Some(10.0)));
        let fetcher = ApiKeyFetcher::new(FakeBilling {
            spend: Ok(0.0),
            auth_rejected: true,
        });

        let result = fetcher.fetch(&ctx).await;
        assert_eq!(result.status, FetchStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_error() {
        let (_dir, ctx) = ctx_with_settings(settings_with_key_and_budget(Some(10.0)));
        let fetcher = ApiKeyFetcher::new(FakeBilling {
            spend: Err(()),
            auth_rejected: false,
        });

        let result = fetcher.fetch(&ctx).await;
        assert_eq!(result.status, FetchStatus::Error);
        assert!(result.error.unwrap().contains("bad payload"));
    }

    #[tokio::test]
    async fn test_env_fallback_resolves_key() {
        let (_dir, ctx) = ctx_with_settings(Settings::default());

        // Unique variable names make this safe alongside other tests.
        unsafe { std::env::set_var("LIMITBAR_TEST_FALLBACK_KEY", "sk-from-env") };
        let fetcher = ApiKeyFetcher::new(FakeBilling {
            spend: Ok(1.0),
            auth_rejected: false,
        });
        let result = fetcher.fetch(&ctx).await;
        unsafe { std::env::remove_var("LIMITBAR_TEST_FALLBACK_KEY") };

        assert!(result.is_ok());
    }
}
