//! Per-provider fetch results.
//!
//! A [`ProviderResult`] is created fresh for every provider in every fetch
//! cycle and handed to the render layer; it is never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::provider::ProviderKind;
use super::usage::UsagePayload;

// ============================================================================
// Fetch Status
// ============================================================================

/// Outcome of one provider fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// Usage data was retrieved.
    Ok,
    /// Fetch failed (network, timeout, parse).
    Error,
    /// No usable credential or key. A state, not an error.
    Unauthenticated,
}

// ============================================================================
// Provider Result
// ============================================================================

/// Result of fetching one provider during a cycle.
///
/// Exactly one exists per enabled provider per cycle, regardless of how the
/// underlying fetch went.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResult {
    /// Which provider this result belongs to.
    pub provider: ProviderKind,
    /// Outcome status.
    pub status: FetchStatus,
    /// Usage data, present when status is `Ok`.
    pub usage: Option<UsagePayload>,
    /// Human-readable error message, present when status is `Error`.
    pub error: Option<String>,
    /// When this result was produced.
    pub fetched_at: DateTime<Utc>,
}

impl ProviderResult {
    /// Creates a successful result carrying usage data.
    pub fn ok(provider: ProviderKind, mut usage: UsagePayload) -> Self {
        usage.sanitize();
        Self {
            provider,
            status: FetchStatus::Ok,
            usage: Some(usage),
            error: None,
            fetched_at: Utc::now(),
        }
    }

    /// Creates an error result with a short diagnostic message.
    pub fn error(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self {
            provider,
            status: FetchStatus::Error,
            usage: None,
            error: Some(message.into()),
            fetched_at: Utc::now(),
        }
    }

    /// Creates an unauthenticated result.
    ///
    /// The message tells the user how to log in; it is not an error.
    pub fn unauthenticated(provider: ProviderKind) -> Self {
        Self {
            provider,
            status: FetchStatus::Unauthenticated,
            usage: None,
            error: Some(format!(
                "No credentials found. Run `limitbar --login {}` to authenticate.",
                provider.id()
            )),
            fetched_at: Utc::now(),
        }
    }

    /// Returns true if the fetch produced usage data.
    pub fn is_ok(&self) -> bool {
        self.status == FetchStatus::Ok
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::usage::UsageWindow;

    #[test]
    fn test_ok_sanitizes_payload() {
        let mut payload = UsagePayload::subscription();
        if let UsagePayload::Subscription { primary, .. } = &mut payload {
            *primary = Some(UsageWindow::new(150.0));
        }

        let result = ProviderResult::ok(ProviderKind::Claude, payload);
        assert!(result.is_ok());
        match result.usage.unwrap() {
            UsagePayload::Subscription { primary, .. } => {
                assert_eq!(primary.unwrap().used_percent, 100.0);
            }
            UsagePayload::Spend(_) => panic!("wrong payload kind"),
        }
    }

    #[test]
    fn test_unauthenticated_names_login_command() {
        let result = ProviderResult::unauthenticated(ProviderKind::Codex);
        assert_eq!(result.status, FetchStatus::Unauthenticated);
        assert!(result.error.unwrap().contains("--login codex"));
    }

    #[test]
    fn test_error_keeps_message() {
        let result = ProviderResult::error(ProviderKind::Cursor, "timeout after 30s");
        assert_eq!(result.status, FetchStatus::Error);
        assert_eq!(result.error.as_deref(), Some("timeout after 30s"));
        assert!(result.usage.is_none());
    }
}
