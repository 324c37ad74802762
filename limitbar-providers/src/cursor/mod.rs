//! Cursor subscription provider.
//!
//! Authentication is a pasted session cookie; there is no refresh protocol.
//! Cookie invalidation is only discovered when the usage fetch is rejected,
//! at which point the provider reports unauthenticated. Transient network
//! failures stay errors so they are never mistaken for a logged-out account.

pub mod fetcher;
pub mod login;
pub mod parser;

pub use fetcher::CursorApi;
pub use login::login;

/// Credential extra field holding the verified account email.
pub const EMAIL_KEY: &str = "email";
