//! OpenAI Codex / ChatGPT subscription provider.
//!
//! Authentication is a PKCE OAuth flow against auth.openai.com. The usage
//! endpoint additionally needs the ChatGPT account id, which is extracted
//! from a claim inside the access-token JWT and stored alongside the tokens.

pub mod fetcher;
pub mod jwt;
pub mod login;
pub mod parser;

pub use fetcher::CodexApi;
pub use jwt::extract_account_id;
pub use login::{login, refresh_access_token};

/// Credential extra field holding the ChatGPT account id.
pub const ACCOUNT_ID_KEY: &str = "account_id";
