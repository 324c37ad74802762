//! Unified credential store.
//!
//! All provider credentials live in one JSON file (`auth.json`), keyed by
//! provider id:
//!
//! ```json
//! {
//!   "claude": {
//!     "access_token": "...",
//!     "refresh_token": "...",
//!     "expires_at": 1735000000000
//!   },
//!   "codex": {
//!     "access_token": "...",
//!     "refresh_token": "...",
//!     "expires_at": 1735000000000,
//!     "account_id": "acct-123"
//!   }
//! }
//! ```
//!
//! The map is loaded lazily on first access, cached for the process lifetime,
//! and re-saved on every mutation. Map access and the save are serialized by
//! a single mutex; the file itself is written atomically with owner-only
//! permissions (see [`crate::persistence`]).

use chrono::Utc;
use limitbar_core::ProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::persistence::{default_auth_path, load_json, save_json};

// ============================================================================
// Credential
// ============================================================================

/// Skew applied to expiry checks so tokens are refreshed slightly early.
pub const REFRESH_SKEW_MS: i64 = 60_000;

/// A stored credential for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Access token, session cookie, or equivalent secret.
    pub access_token: String,

    /// Refresh token, when the provider's protocol issues one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Expiry as milliseconds since epoch. `None` means the credential does
    /// not expire on a schedule (cookies, device-flow tokens).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,

    /// Provider-specific extra fields (account id, email, ...), kept at the
    /// top level of the stored object.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Credential {
    /// Creates a credential with only an access token (cookie-style).
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
            extra: BTreeMap::new(),
        }
    }

    /// Returns the current time in epoch milliseconds.
    pub fn now_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Returns true if the expiry timestamp is within `skew_ms` of now.
    ///
    /// A credential without an expiry never reports expired.
    pub fn is_expired(&self, skew_ms: i64) -> bool {
        self.expires_at
            .is_some_and(|expires| Self::now_ms() + skew_ms >= expires)
    }

    /// Returns true if this credential must be refreshed before use.
    ///
    /// Only credentials carrying a refresh token are refreshable; for those,
    /// a missing expiry is treated as already stale.
    pub fn needs_refresh(&self) -> bool {
        self.refresh_token.is_some()
            && self
                .expires_at
                .is_none_or(|expires| Self::now_ms() + REFRESH_SKEW_MS >= expires)
    }

    /// Returns a string extra field, if present.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// Sets a string extra field.
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra
            .insert(key.into(), serde_json::Value::String(value.into()));
    }
}

// ============================================================================
// Auth Store
// ============================================================================

/// Process-wide credential store backed by a single JSON file.
///
/// Safe to share across concurrent fetch tasks: every read and mutation goes
/// through one mutex, and mutations save before releasing it, so two
/// providers refreshing concurrently can never interleave partial writes.
/// Records for unknown provider ids found on disk are preserved untouched.
#[derive(Debug)]
pub struct AuthStore {
    path: PathBuf,
    // None until first access; the map is keyed by provider id string so
    // unrecognized entries survive a load/save round trip.
    cache: Mutex<Option<HashMap<String, Credential>>>,
}

impl AuthStore {
    /// Creates a store backed by the given file.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cache: Mutex::new(None),
        }
    }

    /// Creates a store backed by the default `auth.json` location.
    pub fn open_default() -> Self {
        Self::new(default_auth_path())
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Returns the stored credential for a provider, if any.
    pub async fn get(&self, provider: ProviderKind) -> Option<Credential> {
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await;
        cache
            .as_ref()
            .and_then(|map| map.get(provider.id()).cloned())
    }

    /// Stores a credential for a provider and persists the store.
    pub async fn put(
        &self,
        provider: ProviderKind,
        credential: Credential,
    ) -> Result<(), StoreError> {
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await;
        let map = cache.get_or_insert_with(HashMap::new);
        map.insert(provider.id().to_string(), credential);
        debug!(provider = %provider, "Credential stored");
        save_json(&self.path, map).await
    }

    /// Removes a provider's credential and persists the store.
    ///
    /// Returns true when a credential existed. Removing a missing entry is a
    /// no-op and does not rewrite the file.
    pub async fn remove(&self, provider: ProviderKind) -> Result<bool, StoreError> {
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await;
        let map = cache.get_or_insert_with(HashMap::new);
        if map.remove(provider.id()).is_none() {
            return Ok(false);
        }
        debug!(provider = %provider, "Credential removed");
        save_json(&self.path, map).await?;
        Ok(true)
    }

    /// Returns all stored credentials keyed by provider id.
    pub async fn load_all(&self) -> HashMap<String, Credential> {
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await;
        cache.as_ref().cloned().unwrap_or_default()
    }

    /// Loads the file into the cache on first access.
    ///
    /// An absent file is an empty store. A malformed file is logged and also
    /// treated as empty - subscription providers simply appear
    /// unauthenticated instead of blocking startup.
    async fn ensure_loaded(&self, cache: &mut Option<HashMap<String, Credential>>) {
        if cache.is_some() {
            return;
        }

        let map = match load_json::<HashMap<String, Credential>>(&self.path).await {
            Ok(map) => map,
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Credential store unreadable, starting empty");
                HashMap::new()
            }
        };

        debug!(entries = map.len(), "Credential store loaded");
        *cache = Some(map);
    }
}

// ============================================================================
// Tests
// ============================================================================
