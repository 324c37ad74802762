//! `--login <provider>` - run a provider's authentication flow.
//!
//! Subscription providers run their interactive protocol (PKCE, device flow,
//! cookie paste) and persist the credential to the auth store. API providers
//! prompt for the key and store it in settings. Either way the provider is
//! enabled in settings afterwards, so the next cycle picks it up.

use limitbar_core::ProviderKind;
use limitbar_fetch::{DebugLog, HttpClient};
use limitbar_providers::{ProviderRegistry, claude, codex, copilot, cursor};
use limitbar_store::{AuthStore, SettingsStore};
use std::io::Write;
use std::sync::Arc;
use tracing::error;

use crate::ExitCode;

/// Runs the login flow for the named provider.
pub async fn run(provider: &str) -> ExitCode {
    let Some(kind) = ProviderRegistry::by_cli_name(provider) else {
        let available: Vec<_> = ProviderRegistry::all()
            .iter()
            .map(|m| m.kind.id())
            .collect();
        eprintln!(
            "Unknown provider for --login: {provider}. Choose one of: {}",
            available.join(", ")
        );
        return ExitCode::Usage;
    };

    match login_kind(kind).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            error!(provider = %kind, error = %e, "Login failed");
            eprintln!("Login failed: {e}");
            ExitCode::Error
        }
    }
}

async fn login_kind(kind: ProviderKind) -> anyhow::Result<()> {
    let http = HttpClient::new().with_debug_log(Arc::new(DebugLog::from_env().await));
    let store = AuthStore::open_default();
    let mut settings = SettingsStore::load_default().await;

    match kind {
        ProviderKind::Claude => {
            let credential = claude::login(&http).await?;
            store.put(kind, credential).await?;
            println!("✓ Claude OAuth credentials saved to {}", store.path().display());
        }
        ProviderKind::Codex => {
            let credential = codex::login(&http).await?;
            store.put(kind, credential).await?;
            println!("✓ Codex OAuth credentials saved to {}", store.path().display());
        }
        ProviderKind::Copilot => {
            let credential = copilot::login(&http).await?;
            store.put(kind, credential).await?;
            println!("✓ GitHub Copilot credentials saved to {}", store.path().display());
        }
        ProviderKind::Cursor => {
            let credential = cursor::login(&http).await?;
            store.put(kind, credential).await?;
            println!("✓ Cursor cookie saved to {}", store.path().display());
        }
        ProviderKind::OpenaiApi => {
            let key = prompt_secret("OpenAI Admin API key (sk-admin-...): ")?;
            settings.set_api_key(kind, key).await?;
            println!("✓ OpenAI API key saved to settings.");
        }
        ProviderKind::AnthropicApi => {
            let key = prompt_secret("Anthropic Admin API key (sk-ant-admin...): ")?;
            settings.set_api_key(kind, key).await?;
            println!("✓ Anthropic API key saved to settings.");
        }
    }

    settings.enable_provider(kind).await?;
    Ok(())
}

fn prompt_secret(message: &str) -> anyhow::Result<String> {
    print!("{message}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let key = line.trim().to_string();
    if key.is_empty() {
        anyhow::bail!("No key entered — aborted.");
    }
    Ok(key)
}
