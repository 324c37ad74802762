// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # limitbar Store
//!
//! Persistence for limitbar:
//!
//! - **AuthStore**: unified credential store (`auth.json`), one record per
//!   provider, mutex-serialized mutation with atomic, owner-only writes
//! - **SettingsStore**: user settings (`config.json`) with enable/disable
//!   side effects for login and logout
//! - **Persistence**: atomic JSON file helpers
//!
//! ## Usage
//!
//! ```ignore
//! use limitbar_store::{AuthStore, Credential, SettingsStore};
//! use limitbar_core::ProviderKind;
//!
//! let store = AuthStore::open_default();
//! store.put(ProviderKind::Claude, Credential::new("token")).await?;
//!
//! let settings = SettingsStore::load_default().await;
//! let enabled = settings.settings().enabled_providers();
//! ```

pub mod auth_store;
pub mod error;
pub mod persistence;
pub mod settings_store;

pub use auth_store::{AuthStore, Credential, REFRESH_SKEW_MS};
pub use error::StoreError;
pub use persistence::{
    default_auth_path, default_config_dir, default_settings_path, load_json,
    load_json_or_default, save_json,
};
pub use settings_store::{
    DEFAULT_REFRESH_SECS, MAX_REFRESH_SECS, MIN_REFRESH_SECS, ProviderConfig, Settings,
    SettingsStore, coerce_budget, validate_refresh_interval,
};
