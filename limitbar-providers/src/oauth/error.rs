//! Auth-flow error types.

use thiserror::Error;

/// Errors raised by interactive login flows and token refresh.
///
/// The first three variants are the user-facing outcomes of `--login`; they
/// map directly to a non-zero exit. `RefreshFailed` means the provider
/// rejected the refresh token - callers clear the stored credential and
/// surface unauthenticated rather than retrying.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login flow did not complete within its time bound.
    #[error("Login timed out after {0}s")]
    LoginTimeout(u64),

    /// The OAuth callback carried a state value we did not generate.
    #[error("OAuth callback state mismatch")]
    StateMismatch,

    /// The user or provider denied the authorization request.
    #[error("Login denied")]
    LoginDenied,

    /// The user aborted the flow (empty input, Ctrl-D).
    #[error("Login cancelled")]
    Cancelled,

    /// Exchanging the authorization/device code for tokens failed.
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// The provider rejected the refresh token.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// Response from the provider was not in the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Transport failure during a login or refresh request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Callback listener IO failure.
    #[error("Callback listener error: {0}")]
    Io(#[from] std::io::Error),

    /// Credential store failure while persisting tokens.
    #[error("Store error: {0}")]
    Store(#[from] limitbar_store::StoreError),
}

impl AuthError {
    /// Returns true when the refresh token itself was rejected, as opposed
    /// to a transient failure while refreshing.
    pub fn is_refresh_rejection(&self) -> bool {
        matches!(self, Self::RefreshFailed(_))
    }
}
