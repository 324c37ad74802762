//! GitHub Copilot subscription provider.
//!
//! Authentication is the GitHub device flow. Device-flow tokens are
//! long-lived with no refresh token and no expiry; they stay valid until the
//! user revokes them, so "refresh" is a no-op and invalidation only shows up
//! as a rejected fetch.

pub mod fetcher;
pub mod login;
pub mod parser;

pub use fetcher::CopilotApi;
pub use login::login;
