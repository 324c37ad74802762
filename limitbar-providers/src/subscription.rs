//! Shared lifecycle for credential-gated subscription providers.
//!
//! Every subscription provider implements [`SubscriptionApi`] (refresh + the
//! provider-specific data fetch); [`SubscriptionFetcher`] wraps it with the
//! common lifecycle:
//!
//! 1. Load the credential - absent means `unauthenticated`, no network I/O
//! 2. Refresh when stale (one attempt), persisting the new token; a rejected
//!    refresh token clears the credential and reports `unauthenticated`
//! 3. Run the provider fetch, bounded by the context timeout
//! 4. Convert every failure into a result - nothing escapes this boundary

use async_trait::async_trait;
use limitbar_core::{ProviderKind, ProviderResult, UsagePayload};
use limitbar_fetch::{FetchContext, FetchError, FetchProvider, HttpClient};
use limitbar_store::Credential;
use tracing::{debug, warn};

use crate::oauth::AuthError;

// ============================================================================
// Subscription API
// ============================================================================

/// Provider-specific pieces of the subscription lifecycle.
#[async_trait]
pub trait SubscriptionApi: Send + Sync {
    /// The provider this API serves.
    fn kind(&self) -> ProviderKind;

    /// Exchanges a refresh token for fresh credentials.
    ///
    /// The default is a no-op for protocols without a refresh mechanism
    /// (device-flow tokens, cookies); expiry for those is only discovered
    /// when a fetch is rejected.
    async fn refresh(
        &self,
        _http: &HttpClient,
        credential: &Credential,
    ) -> Result<Credential, AuthError> {
        Ok(credential.clone())
    }

    /// Credential to use when the store has none.
    ///
    /// Cookie providers override this to pick up an environment-variable
    /// cookie. Fallback credentials are never persisted.
    fn fallback_credential(&self) -> Option<Credential> {
        None
    }

    /// Fetches usage with a usable credential.
    async fn fetch_usage(
        &self,
        ctx: &FetchContext,
        credential: &Credential,
    ) -> Result<UsagePayload, FetchError>;
}

// ============================================================================
// Subscription Fetcher
// ============================================================================

/// [`FetchProvider`] adapter wrapping a [`SubscriptionApi`].
pub struct SubscriptionFetcher<A> {
    api: A,
}

impl<A: SubscriptionApi> SubscriptionFetcher<A> {
    /// Wraps a provider API in the shared lifecycle.
    pub fn new(api: A) -> Self {
        Self { api }
    }
}

#[async_trait]
impl<A: SubscriptionApi> FetchProvider for SubscriptionFetcher<A> {
    fn kind(&self) -> ProviderKind {
        self.api.kind()
    }

    async fn fetch(&self, ctx: &FetchContext) -> ProviderResult {
        let kind = self.api.kind();

        let stored = ctx.auth.get(kind).await;
        let Some(mut credential) = stored.or_else(|| self.api.fallback_credential()) else {
            debug!(provider = %kind, "No stored credential");
            return ProviderResult::unauthenticated(kind);
        };

        if credential.needs_refresh() {
            debug!(provider = %kind, "Credential stale, refreshing");
            match self.api.refresh(&ctx.http, &credential).await {
                Ok(fresh) => {
                    if let Err(e) = ctx.auth.put(kind, fresh.clone()).await {
                        warn!(provider = %kind, error = %e, "Could not persist refreshed credential");
                    }
                    credential = fresh;
                }
                Err(e) if e.is_refresh_rejection() => {
                    warn!(provider = %kind, error = %e, "Refresh token rejected, clearing credential");
                    if let Err(e) = ctx.auth.remove(kind).await {
                        warn!(provider = %kind, error = %e, "Could not clear credential");
                    }
                    return ProviderResult::unauthenticated(kind);
                }
                Err(e) => {
                    // Transient refresh failure is not a logout.
                    warn!(provider = %kind, error = %e, "Refresh failed");
                    return ProviderResult::error(kind, format!("token refresh failed: {e}"));
                }
            }
        }

        match self.api.fetch_usage(ctx, &credential).await {
            Ok(payload) => ProviderResult::ok(kind, payload),
            Err(e) if e.is_auth() => {
                debug!(provider = %kind, "Provider rejected credential");
                ProviderResult::unauthenticated(kind)
            }
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
    use limitbar_core::{FetchStatus, UsageWindow};
    use limitbar_store::AuthStore;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scripted provider API for lifecycle tests.
    struct ScriptedApi {
        refresh_outcome: RefreshOutcome,
        fetch_outcome: FetchOutcome,
        refresh_calls: AtomicUsize,
        fetch_calls: AtomicUsize,
    }

    enum RefreshOutcome {
        Succeed,
        Reject,
        NetworkError,
    }

    enum FetchOutcome {
        Succeed,
        Reject,
        NetworkError,
    }

    impl ScriptedApi {
        fn new(refresh: RefreshOutcome, fetch: FetchOutcome) -> Self {
            Self {
                refresh_outcome: refresh,
                fetch_outcome: fetch,
                refresh_calls: AtomicUsize::new(0),
                fetch_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SubscriptionApi for Arc<ScriptedApi> {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Claude
        }

        async fn refresh(
            &self,
            _http: &HttpClient,
            _credential: &Credential,
        ) -> Result<Credential, AuthError> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            match self.refresh_outcome {
                RefreshOutcome::Succeed => {
                    let mut fresh = Credential::new("refreshed-token");
                    fresh.refresh_token = Some("new-refresh".to_string());
                    fresh.expires_at = Some(Credential::now_ms() + 3_600_000);
                    Ok(fresh)
                }
                RefreshOutcome::Reject => Err(AuthError::RefreshFailed("invalid_grant".to_string())),
                RefreshOutcome::NetworkError => {
                    Err(AuthError::TokenExchange("connection reset".to_string()))
                }
            }
        }

        async fn fetch_usage(
            &self,
            _ctx: &FetchContext,
            credential: &Credential,
        ) -> Result<UsagePayload, FetchError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            match self.fetch_outcome {
                FetchOutcome::Succeed => {
                    assert!(!credential.access_token.is_empty());
                    let mut payload = UsagePayload::subscription();
                    if let UsagePayload::Subscription { primary, .. } = &mut payload {
                        *primary = Some(UsageWindow::new(42.5));
                    }
                    Ok(payload)
                }
                FetchOutcome::Reject => Err(FetchError::Unauthenticated),
                FetchOutcome::NetworkError => Err(FetchError::InvalidResponse(
                    "Expected JSON, got: <html>".to_string(),
                )),
            }
        }
    }

    fn expired_credential() -> Credential {
        let mut cred = Credential::new("old-token");
        cred.refresh_token = Some("old-refresh".to_string());
        cred.expires_at = Some(0);
        cred
    }

    fn valid_credential() -> Credential {
        let mut cred = Credential::new("valid-token");
        cred.refresh_token = Some("refresh".to_string());
        cred.expires_at = Some(Credential::now_ms() + 3_600_000);
        cred
    }

    fn test_ctx() -> (tempfile::TempDir, FetchContext) {
        let dir = tempfile::tempdir().unwrap();
        let ctx = FetchContext::builder()
            .auth(Arc::new(AuthStore::new(dir.path().join("auth.json"))))
            .timeout(Duration::from_secs(5))
            .build();
        (dir, ctx)
    }

    #[tokio::test]
    async fn test_no_credential_short_circuits_to_unauthenticated() {
        let (_dir, ctx) = test_ctx();
        let api = Arc::new(ScriptedApi::new(RefreshOutcome::Succeed, FetchOutcome::Succeed));
        let fetcher = SubscriptionFetcher::new(Arc::clone(&api));

        let result = fetcher.fetch(&ctx).await;
        assert_eq!(result.status, FetchStatus::Unauthenticated);
        // No network I/O of any kind.
        assert_eq!(api.refresh_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_credential_skips_refresh() {
        let (_dir, ctx) = test_ctx();
        ctx.auth
            .put(ProviderKind::Claude, valid_credential())
            .await
            .unwrap();

        let api = Arc::new(ScriptedApi::new(RefreshOutcome::Succeed, FetchOutcome::Succeed));
        let fetcher = SubscriptionFetcher::new(Arc::clone(&api));

        let result = fetcher.fetch(&ctx).await;
        assert!(result.is_ok());
        assert_eq!(api.refresh_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_credential_refreshes_once_and_persists() {
        let (_dir, ctx) = test_ctx();
        ctx.auth
            .put(ProviderKind::Claude, expired_credential())
            .await
            .unwrap();

        let api = Arc::new(ScriptedApi::new(RefreshOutcome::Succeed, FetchOutcome::Succeed));
        let fetcher = SubscriptionFetcher::new(Arc::clone(&api));

        let result = fetcher.fetch(&ctx).await;
        assert!(result.is_ok());
        assert_eq!(api.refresh_calls.load(Ordering::SeqCst), 1);

        // Round-trip: the store now holds the refreshed token.
        let stored = ctx.auth.get(ProviderKind::Claude).await.unwrap();
        assert_eq!(stored.access_token, "refreshed-token");
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_credential() {
        let (_dir, ctx) = test_ctx();
        ctx.auth
            .put(ProviderKind::Claude, expired_credential())
            .await
            .unwrap();

        let api = Arc::new(ScriptedApi::new(RefreshOutcome::Reject, FetchOutcome::Succeed));
        let fetcher = SubscriptionFetcher::new(Arc::clone(&api));

        let result = fetcher.fetch(&ctx).await;
        assert_eq!(result.status, FetchStatus::Unauthenticated);
        assert!(ctx.auth.get(ProviderKind::Claude).await.is_none());
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transient_refresh_failure_is_error_not_logout() {
        let (_dir, ctx) = test_ctx();
        ctx.auth
            .put(ProviderKind::Claude, expired_credential())
            .await
            .unwrap();

        let api = Arc::new(ScriptedApi::new(
            RefreshOutcome::NetworkError,
            FetchOutcome::Succeed,
        ));
        let fetcher = SubscriptionFetcher::new(Arc::clone(&api));

        let result = fetcher.fetch(&ctx).await;
        assert_eq!(result.status, FetchStatus::Error);
        // Credential survives a transient failure.
        assert!(ctx.auth.get(ProviderKind::Claude).await.is_some());
    }

    #[tokio::test]
    async fn test_rejected_fetch_reports_unauthenticated() {
        let (_dir, ctx) = test_ctx();
        ctx.auth
            .put(ProviderKind::Claude, valid_credential())
            .await
            .unwrap();

        let api = Arc::new(ScriptedApi::new(RefreshOutcome::Succeed, FetchOutcome::Reject));
        let fetcher = SubscriptionFetcher::new(Arc::clone(&api));

        let result = fetcher.fetch(&ctx).await;
        assert_eq!(result.status, FetchStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_fetch_failure_reports_error_with_message() {
        let (_dir, ctx) = test_ctx();
        ctx.auth
            .put(ProviderKind::Claude, valid_credential())
            .await
            .unwrap();

        let api = Arc::new(ScriptedApi::new(
            RefreshOutcome::Succeed,
            FetchOutcome::NetworkError,
        ));
        let fetcher = SubscriptionFetcher::new(Arc::clone(&api));

        let result = fetcher.fetch(&ctx).await;
        assert_eq!(result.status, FetchStatus::Error);
        assert!(result.error.unwrap().contains("Expected JSON"));
    }

    #[tokio::test]
    async fn test_cookie_credential_without_expiry_fetches_directly() {
        let (_dir, ctx) = test_ctx();
        ctx.auth
            .put(ProviderKind::Claude, Credential::new("cookie-value"))
            .await
            .unwrap();

        let api = Arc::new(ScriptedApi::new(RefreshOutcome::Reject, FetchOutcome::Succeed));
        let fetcher = SubscriptionFetcher::new(Arc::clone(&api));

        let result = fetcher.fetch(&ctx).await;
        assert!(result.is_ok());
        // No refresh token, so the (rejecting) refresh path is never taken.
        assert_eq!(api.refresh_calls.load(Ordering::SeqCst), 0);
    }
}
