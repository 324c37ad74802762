//! Default run mode - periodic refresh loop.
//!
//! Runs one cycle, renders it, sleeps for the refresh interval, repeats.
//! Each cycle fully resolves before the next starts, so refresh races can
//! never compound across cycles.

use anyhow::Result;
use limitbar_fetch::{DebugLog, FetchContext, HttpClient, run_cycle};
use limitbar_providers::ProviderRegistry;
use limitbar_store::{AuthStore, Settings};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::output::{TextFormatter, ordered_results};

/// Runs the refresh loop until interrupted.
pub async fn run(settings: &Settings, use_colors: bool) -> Result<()> {
    let fetchers = ProviderRegistry::enabled_fetchers(settings);
    if fetchers.is_empty() {
        println!("No providers enabled. Run `limitbar --login <provider>` or edit the config.");
        return Ok(());
    }

    let refresh_interval = settings.refresh_interval;
    info!(interval = refresh_interval, "Starting watch mode");

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

    let formatter = TextFormatter::new(use_colors);

    loop {
        let results = run_cycle(&fetchers, &ctx).await;
        let ordered = ordered_results(&results, settings);

        // Clear screen and redraw.
        print!("\x1b[2J\x1b[H");
        std::io::stdout().flush()?;

        let now = chrono::Local::now();
        println!(
            "limitbar — {} (refresh: {refresh_interval}s, Ctrl-C to quit)",
            now.format("%H:%M:%S")
        );
        println!("{}", "─".repeat(50));
        println!();

        for result in &ordered {
            println!("{}", formatter.format_result(result));
            println!();
        }

        tokio::time::sleep(Duration::from_secs(refresh_interval)).await;
    }
}
