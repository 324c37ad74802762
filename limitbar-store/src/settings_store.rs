//! User settings store.
//!
//! Settings live in `config.json`: an ordered provider list plus the
//! auto-refresh interval. The file is optional - an absent file means zero
//! enabled providers - and a malformed file falls back to defaults with a
//! warning instead of failing startup.

use limitbar_core::ProviderKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json, save_json};

// ============================================================================
// Refresh Interval
// ============================================================================

/// Minimum auto-refresh interval in seconds.
pub const MIN_REFRESH_SECS: u64 = 60;

/// Maximum auto-refresh interval in seconds.
pub const MAX_REFRESH_SECS: u64 = 3600;

/// Default auto-refresh interval in seconds.
pub const DEFAULT_REFRESH_SECS: u64 = 300;

/// Validates a refresh interval against the allowed range.
pub fn validate_refresh_interval(seconds: u64) -> Result<u64, StoreError> {
    if (MIN_REFRESH_SECS..=MAX_REFRESH_SECS).contains(&seconds) {
        Ok(seconds)
    } else {
        Err(StoreError::InvalidConfig(format!(
            "refresh interval {seconds}s is outside the valid range {MIN_REFRESH_SECS}-{MAX_REFRESH_SECS}"
        )))
    }
}

// ============================================================================
// Settings Types
// ============================================================================

/// Per-provider settings entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider this entry configures.
    pub id: ProviderKind,

    /// Whether the provider participates in fetch cycles.
    pub enabled: bool,

    /// API key override; takes precedence over environment variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Monthly budget in USD for API-billing providers.
    ///
    /// Tolerates a JSON string or number; invalid or negative values disable
    /// the budget rather than failing config load.
    #[serde(default, deserialize_with = "deserialize_budget")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<f64>,
}

impl ProviderConfig {
    /// Creates a disabled entry for a provider.
    pub fn new(id: ProviderKind) -> Self {
        Self {
            id,
            enabled: false,
            api_key: None,
            monthly_budget: None,
        }
    }
}

/// Coerces the budget from a JSON number or numeric string.
fn deserialize_budget<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(coerce_budget))
}

/// Returns a positive budget value, or `None` for anything unusable.
pub fn coerce_budget(value: &serde_json::Value) -> Option<f64> {
    let budget = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    budget.filter(|b| b.is_finite() && *b > 0.0)
}

/// User settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Ordered provider entries; order drives display order.
    pub providers: Vec<ProviderConfig>,

    /// Auto-refresh interval in seconds (60-3600).
    pub refresh_interval: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            providers: ProviderKind::all()
                .iter()
                .map(|kind| ProviderConfig::new(*kind))
                .collect(),
            refresh_interval: DEFAULT_REFRESH_SECS,
        }
    }
}

impl Settings {
    /// Returns enabled providers in configured order.
    pub fn enabled_providers(&self) -> Vec<ProviderKind> {
        self.providers
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.id)
            .collect()
    }

    /// Returns the entry for a provider, if present.
    pub fn provider(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.id == kind)
    }

    /// Returns the API key override for a provider, if configured.
    pub fn api_key(&self, kind: ProviderKind) -> Option<&str> {
        self.provider(kind)
            .and_then(|p| p.api_key.as_deref())
            .filter(|k| !k.is_empty())
    }

    /// Returns the monthly budget for a provider, if configured.
    pub fn monthly_budget(&self, kind: ProviderKind) -> Option<f64> {
        self.provider(kind).and_then(|p| p.monthly_budget)
    }

    /// Returns the entry for a provider, creating a disabled one if absent.
    fn provider_mut(&mut self, kind: ProviderKind) -> &mut ProviderConfig {
        if let Some(pos) = self.providers.iter().position(|p| p.id == kind) {
            &mut self.providers[pos]
        } else {
            self.providers.push(ProviderConfig::new(kind));
            self.providers.last_mut().expect("just pushed")
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings with a backing file.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Loads settings from the given path.
    ///
    /// Absent file ⇒ defaults (zero enabled providers). Corrupt file ⇒
    /// defaults with a warning, never a startup failure.
    pub async fn load(path: PathBuf) -> Self {
        let settings = match load_json::<Settings>(&path).await {
            Ok(settings) => settings,
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file, using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Settings unreadable, using defaults");
                Settings::default()
            }
        };
        Self { path, settings }
    }

    /// Loads settings from the default location.
    pub async fn load_default() -> Self {
        Self::load(default_settings_path()).await
    }

    /// Returns the current settings snapshot.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Overrides the refresh interval after validating the range.
    pub fn set_refresh_interval(&mut self, seconds: u64) -> Result<(), StoreError> {
        self.settings.refresh_interval = validate_refresh_interval(seconds)?;
        Ok(())
    }

    /// Enables a provider and persists the change (login side effect).
    pub async fn enable_provider(&mut self, kind: ProviderKind) -> Result<(), StoreError> {
        self.settings.provider_mut(kind).enabled = true;
        info!(provider = %kind, "Provider enabled");
        self.save().await
    }

    /// Disables a provider, clears any stored API key, and persists the
    /// change (logout side effect).
    pub async fn disable_provider(&mut self, kind: ProviderKind) -> Result<(), StoreError> {
        let entry = self.settings.provider_mut(kind);
        entry.enabled = false;
        entry.api_key = None;
        info!(provider = %kind, "Provider disabled");
        self.save().await
    }

    /// Stores an API key override for a provider and persists the change.
    pub async fn set_api_key(
        &mut self,
        kind: ProviderKind,
        key: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.settings.provider_mut(kind).api_key = Some(key.into());
        self.save().await
    }

    /// Persists the current settings.
    pub async fn save(&self) -> Result<(), StoreError> {
        save_json(&self.path, &self.settings).await
    }

    /// Writes a default settings file, refusing to overwrite an existing one.
    ///
    /// Returns true when a file was created.
    pub async fn init_default_file(path: PathBuf) -> Result<bool, StoreError> {
        if tokio::fs::try_exists(&path).await? {
            return Ok(false);
        }
        save_json(&path, &Settings::default()).await?;
        info!(path = %path.display(), "Default settings written");
        Ok(true)
    }
}

// ============================================================================
// Tests
// ============================================================================
