// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! limitbar CLI - terminal dashboard for AI provider usage and spend limits.
//!
//! # Examples
//!
//! ```bash
//! # Watch mode: refresh every 5 minutes (or the configured interval)
//! limitbar
//!
//! # One-shot snapshot to stdout
//! limitbar --snapshot
//!
//! # Machine-readable snapshot
//! limitbar --snapshot --json
//!
//! # Authenticate a provider, then remove its credentials again
//! limitbar --login claude
//! limitbar --logout claude
//!
//! # Override the refresh interval (60-3600 seconds)
//! limitbar --refresh 120
//!
//! # Write a default config file
//! limitbar --init-config
//! ```

mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// ============================================================================
// CLI Definition
// ============================================================================

/// limitbar - terminal dashboard for AI provider usage limits.
#[derive(Parser)]
#[command(name = "limitbar")]
#[command(about = "Terminal dashboard for AI provider usage and spend limits")]
#[command(version)]
pub struct Cli {
    /// Auto-refresh interval in seconds (60-3600).
    #[arg(long, value_name = "SECONDS")]
    pub refresh: Option<u64>,

    /// Fetch and print data once to stdout, then exit.
    #[arg(long)]
    pub snapshot: bool,

    /// With --snapshot, emit JSON instead of text.
    #[arg(long = "json")]
    pub json_output: bool,

    /// Create a default config file and exit.
    #[arg(long)]
    pub init_config: bool,

    /// Authenticate with a provider.
    #[arg(long, value_name = "PROVIDER")]
    pub login: Option<String>,

    /// Remove stored credentials for a provider.
    #[arg(long, value_name = "PROVIDER")]
    pub logout: Option<String>,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Verbose output (show debug logging).
    #[arg(long, short)]
    pub verbose: bool,

    /// Quiet mode (no logging).
    #[arg(long, short)]
    pub quiet: bool,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success - includes snapshots with per-provider failures.
    Success = 0,
    /// Login or runtime failure.
    Error = 1,
    /// Usage or configuration error.
    Usage = 2,
}

fn exit(code: ExitCode) -> ! {
    std::process::exit(code as i32);
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("limitbar=debug,info")
    } else {
        EnvFilter::new("limitbar=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if cli.init_config {
        match commands::init_config::run().await {
            Ok(()) => exit(ExitCode::Success),
            Err(e) => {
                eprintln!("Error: {e}");
                exit(ExitCode::Error);
            }
        }
    }

    if cli.login.is_some() && cli.logout.is_some() {
        eprintln!("Specify only one of --login or --logout.");
        exit(ExitCode::Usage);
    }

    if cli.json_output && !cli.snapshot {
        eprintln!("--json can only be used with --snapshot.");
        exit(ExitCode::Usage);
    }

    if let Some(provider) = &cli.login {
        exit(commands::login::run(provider).await);
    }

    if let Some(provider) = &cli.logout {
        exit(commands::logout::run(provider).await);
    }

    // Settings snapshot for this process; --refresh overrides after
    // validation - out of range is a configuration error, not a clamp.
    let mut settings_store = limitbar_store::SettingsStore::load_default().await;
    if let Some(seconds) = cli.refresh {
        if let Err(e) = settings_store.set_refresh_interval(seconds) {
            eprintln!("Error: {e}");
            exit(ExitCode::Usage);
        }
    }
    let settings = settings_store.settings().clone();

    let result = if cli.snapshot {
        commands::snapshot::run(&settings, cli.json_output, !cli.no_color).await
    } else {
        commands::watch::run(&settings, !cli.no_color).await
    };

    match result {
        Ok(()) => exit(ExitCode::Success),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e}");
            }
            exit(ExitCode::Error);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_snapshot_flags() {
        let cli = Cli::parse_from(["limitbar", "--snapshot", "--json"]);
        assert!(cli.snapshot);
        assert!(cli.json_output);
    }

    #[test]
    fn test_parse_login() {
        let cli = Cli::parse_from(["limitbar", "--login", "claude"]);
        assert_eq!(cli.login.as_deref(), Some("claude"));
        assert!(cli.logout.is_none());
    }

    #[test]
    fn test_parse_refresh_override() {
        let cli = Cli::parse_from(["limitbar", "--refresh", "90"]);
        assert_eq!(cli.refresh, Some(90));
    }
}
