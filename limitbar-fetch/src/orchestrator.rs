//! Fetch-cycle orchestrator.
//!
//! One cycle invokes every enabled provider concurrently, bounds each fetch
//! with the per-fetch timeout, and returns exactly one result per provider.
//! A provider that hangs or fails never delays or cancels the others, and no
//! provider is ever dropped from the result map.

use futures::future::join_all;
use limitbar_core::{ProviderKind, ProviderResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::context::{FetchContext, FetchProvider};

/// Runs one fetch cycle over the given providers.
///
/// Every fetch is wrapped in its own `tokio::time::timeout`; exceeding the
/// bound yields a synthetic `error` result instead of waiting indefinitely.
/// The cycle completes when all fetches have resolved - there is no
/// early-exit on first failure. The caller is responsible for passing only
/// enabled providers and for not overlapping cycles.
#[instrument(skip(providers, ctx), fields(count = providers.len()))]
pub async fn run_cycle(
    providers: &[Arc<dyn FetchProvider>],
    ctx: &FetchContext,
) -> HashMap<ProviderKind, ProviderResult> {
    if providers.is_empty() {
        return HashMap::new();
    }

    info!(count = providers.len(), "Starting fetch cycle");

    let fetches = providers.iter().map(|provider| {
        let provider = Arc::clone(provider);
        async move {
            let kind = provider.kind();
            debug!(provider = %kind, "Fetching");

            match tokio::time::timeout(ctx.timeout, provider.fetch(ctx)).await {
                Ok(result) => (kind, result),
                Err(_) => {
                    warn!(provider = %kind, timeout = ?ctx.timeout, "Fetch timed out");
                    let secs = ctx.timeout.as_secs();
                    (kind, ProviderResult::error(kind, format!("timeout after {secs}s")))
                }
            }
        }
    });

    let results: HashMap<_, _> = join_all(fetches).await.into_iter().collect();

    info!(
        ok = results.values().filter(|r| r.is_ok()).count(),
        total = results.len(),
        "Fetch cycle complete"
    );
    results
}

// ============================================================================
// Tests
// ============================================================================
