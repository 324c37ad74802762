//! Fetch context and the provider fetch contract.
//!
//! A [`FetchContext`] carries everything a provider needs during one cycle:
//! the shared credential store, an immutable settings snapshot, the per-fetch
//! timeout, and the shared HTTP client. [`FetchProvider`] is the single
//! contract the orchestrator depends on.

use async_trait::async_trait;
use limitbar_core::{ProviderKind, ProviderResult};
use limitbar_store::{AuthStore, Settings};
use std::sync::Arc;
use std::time::Duration;

use crate::client::HttpClient;

/// Default per-fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Fetch Context
// ============================================================================

/// Shared state handed to every provider fetch in a cycle.
#[derive(Clone)]
pub struct FetchContext {
    /// Shared credential store. Mutations are serialized internally.
    pub auth: Arc<AuthStore>,
    /// Immutable settings snapshot for this cycle.
    pub settings: Settings,
    /// Per-fetch timeout; the orchestrator also enforces this bound.
    pub timeout: Duration,
    /// Shared HTTP client.
    pub http: HttpClient,
}

impl FetchContext {
    /// Starts building a context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::default()
    }
}

/// Builder for [`FetchContext`].
#[derive(Default)]
pub struct FetchContextBuilder {
    auth: Option<Arc<AuthStore>>,
    settings: Option<Settings>,
    timeout: Option<Duration>,
    http: Option<HttpClient>,
}

impl FetchContextBuilder {
    /// Sets the credential store.
    pub fn auth(mut self, auth: Arc<AuthStore>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the settings snapshot.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Sets the per-fetch timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the HTTP client.
    pub fn http(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Builds the context, filling unset fields with defaults.
    pub fn build(self) -> FetchContext {
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS));
        FetchContext {
            auth: self.auth.unwrap_or_else(|| Arc::new(AuthStore::open_default())),
            settings: self.settings.unwrap_or_default(),
            timeout,
            http: self.http.unwrap_or_else(|| HttpClient::with_timeout(timeout)),
        }
    }
}

// ============================================================================
// Fetch Provider Contract
// ============================================================================

/// The single callable contract shared by all runtime provider variants.
///
/// `fetch` never fails: every failure mode is converted into a
/// [`ProviderResult`] with status `error` or `unauthenticated` at this
/// boundary. Nothing above the orchestrator ever sees an error from a fetch.
#[async_trait]
pub trait FetchProvider: Send + Sync {
    /// The provider this fetcher handles.
    fn kind(&self) -> ProviderKind;

    /// Fetches usage for this provider, bounded by the context timeout.
    async fn fetch(&self, ctx: &FetchContext) -> ProviderResult;
}
