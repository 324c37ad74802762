//! `--logout <provider>` - clear stored credentials.
//!
//! Removes the credential record (and any stored API key) and disables the
//! provider. Succeeds even when nothing was stored.

use limitbar_providers::ProviderRegistry;
use limitbar_store::{AuthStore, SettingsStore};
use tracing::error;

use crate::ExitCode;

/// Clears credentials for the named provider.
pub async fn run(provider: &str) -> ExitCode {
    let Some(kind) = ProviderRegistry::by_cli_name(provider) else {
        let available: Vec<_> = ProviderRegistry::all()
            .iter()
            .map(|m| m.kind.id())
            .collect();
        eprintln!(
            "Unknown provider for --logout: {provider}. Choose one of: {}",
            available.join(", ")
        );
        return ExitCode::Usage;
    };

    let store = AuthStore::open_default();
    let display = kind.display_name();

    match store.remove(kind).await {
        Ok(true) => println!("✓ Removed {display} credentials."),
        Ok(false) => println!("No {display} credentials stored."),
        Err(e) => {
            error!(provider = %kind, error = %e, "Logout failed");
            eprintln!("Logout failed: {e}");
            return ExitCode::Error;
        }
    }

    let mut settings = SettingsStore::load_default().await;
    if let Err(e) = settings.disable_provider(kind).await {
        error!(provider = %kind, error = %e, "Could not disable provider");
        eprintln!("Warning: could not disable {display} in settings: {e}");
    }

    ExitCode::Success
}
