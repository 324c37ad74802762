//! Anthropic Claude subscription provider.
//!
//! Authentication is a PKCE OAuth flow against claude.ai; usage comes from
//! the OAuth usage endpoint, with a best-effort profile call for identity.

pub mod fetcher;
pub mod login;
pub mod parser;

pub use fetcher::ClaudeApi;
pub use login::{login, refresh_access_token};
