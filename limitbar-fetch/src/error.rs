//! Fetch error types.

use thiserror::Error;

/// Error type for data-fetch operations.
///
/// Credential rejection ([`FetchError::Unauthenticated`]) is deliberately a
/// separate variant from transient failures, so an invalid cookie and a flaky
/// network never collapse into the same user-visible state.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP transport failed (connection, TLS, client timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status with a short body preview.
    #[error("HTTP {code}: {body}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Body preview, truncated.
        body: String,
    },

    /// The provider rejected the credential or key (401/403).
    #[error("Credential rejected by provider")]
    Unauthenticated,

    /// Fetch exceeded the per-fetch timeout.
    #[error("timeout after {0}s")]
    Timeout(u64),

    /// Response was not in the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    /// Returns true when the failure means the credential itself is invalid,
    /// as opposed to a transient fetch failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_stay_distinguishable() {
        assert!(FetchError::Unauthenticated.is_auth());
        assert!(!FetchError::Timeout(30).is_auth());
        assert!(
            !FetchError::Status {
                code: 500,
                body: "oops".to_string()
            }
            .is_auth()
        );
    }

    #[test]
    fn test_timeout_message() {
        assert_eq!(FetchError::Timeout(30).to_string(), "timeout after 30s");
    }
}
