//! Optional HTTP debug log.
//!
//! When `LIMITBAR_DEBUG=1` is set, every HTTP request/response pair is
//! appended as one JSON line to the debug log file. The log includes URLs and
//! may include tokens in future fields, so the file is created with owner-only
//! permissions. Disabled by default; a disabled log is a no-op.

use chrono::Utc;
use serde_json::json;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// Environment variable that enables the debug log.
pub const DEBUG_ENV: &str = "LIMITBAR_DEBUG";

/// Environment variable overriding the debug log path.
pub const DEBUG_PATH_ENV: &str = "LIMITBAR_DEBUG_LOG";

/// Returns the default debug log path.
fn default_debug_path() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support").join("limitbar"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("debug.log")
    }

    #[cfg(not(target_os = "macos"))]
    {
        dirs::config_dir()
            .map(|c| c.join("limitbar"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("debug.log")
    }
}

// ============================================================================
// Debug Log
// ============================================================================

/// JSON-lines HTTP debug log, gated by environment variables.
#[derive(Debug, Default)]
pub struct DebugLog {
    // None when disabled.
    file: Option<Mutex<tokio::fs::File>>,
}

impl DebugLog {
    /// Creates a disabled log.
    pub fn disabled() -> Self {
        Self { file: None }
    }

    /// Creates a log based on `LIMITBAR_DEBUG` / `LIMITBAR_DEBUG_LOG`.
    ///
    /// Failure to open the log file disables logging with a warning rather
    /// than failing the process.
    pub async fn from_env() -> Self {
        let enabled = std::env::var(DEBUG_ENV)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if !enabled {
            return Self::disabled();
        }

        let path = std::env::var(DEBUG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_debug_path());

        Self::open(path).await
    }

    /// Opens a log at the given path with owner-only permissions.
    pub async fn open(path: PathBuf) -> Self {
        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!(path = %path.display(), error = %e, "Cannot create debug log directory");
                return Self::disabled();
            }
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        match options.open(&path).await {
            Ok(file) => Self {
                file: Some(Mutex::new(file)),
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot open debug log");
                Self::disabled()
            }
        }
    }

    /// Returns true when logging is active.
    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Logs one HTTP event as a JSON line.
    ///
    /// `headers` are recorded verbatim - including authorization values -
    /// which is the point of the debug log; that is why the file is
    /// owner-only and the log is off unless explicitly enabled.
    pub async fn log(
        &self,
        tag: &str,
        event: &str,
        method: &str,
        url: &str,
        status: Option<u16>,
        headers: Option<&reqwest::header::HeaderMap>,
    ) {
        let Some(file) = &self.file else {
            return;
        };

        let mut entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "tag": tag,
            "event": event,
            "method": method,
            "url": url,
        });
        if let Some(status) = status {
            entry["status"] = json!(status);
        }
        if let Some(headers) = headers {
            let map: serde_json::Map<String, serde_json::Value> = headers
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        json!(value.to_str().unwrap_or("<binary>")),
                    )
                })
                .collect();
            entry["headers"] = serde_json::Value::Object(map);
        }

        let mut line = entry.to_string();
        line.push('\n');

        let mut file = file.lock().await;
        if let Err(e) = file.write_all(line.as_bytes()).await {
            warn!(error = %e, "Debug log write failed");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
