//! `--snapshot` - one fetch cycle printed to stdout.
//!
//! Partial provider failure is not a process failure: the snapshot renders
//! every enabled provider with its status and exits 0.

use anyhow::Result;
use limitbar_fetch::{DebugLog, FetchContext, HttpClient, run_cycle};
use limitbar_providers::ProviderRegistry;
use limitbar_store::{AuthStore, Settings};
use std::sync::Arc;
use std::time::Duration;

use crate::output::{JsonFormatter, TextFormatter, ordered_results};

/// Runs one cycle and prints the results.
pub async fn run(settings: &Settings, json: bool, use_colors: bool) -> Result<()> {
    let fetchers = ProviderRegistry::enabled_fetchers(settings);
    if fetchers.is_empty() {
        println!("No providers enabled. Run `limitbar --login <provider>` or edit the config.");
        return Ok(());
    }

    let timeout = Duration::from_secs(limitbar_fetch::DEFAULT_FETCH_TIMEOUT_SECS);
    let ctx = FetchContext::builder()
        .auth(Arc::new(AuthStore::open_default()))
        .settings(settings.clone())
        .timeout(timeout)
        .http(
            HttpClient::with_timeout(timeout)
                .with_debug_log(Arc::new(DebugLog::from_env().await)),
        )
        .build();

    let results = run_cycle(&fetchers, &ctx).await;
    let ordered = ordered_results(&results, settings);

    if json {
        println!("{}", JsonFormatter::new(true).format(&ordered)?);
    } else {
        let formatter = TextFormatter::new(use_colors);
        let mut first = true;
        for result in &ordered {
            if !first {
                println!();
            }
            first = false;
            println!("{}", formatter.format_result(result));
        }
    }

    Ok(())
}
