//! Codex interactive login - PKCE OAuth flow - and token refresh.

use limitbar_fetch::{FetchError, HttpClient};
use limitbar_store::Credential;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::ACCOUNT_ID_KEY;
use super::jwt::extract_account_id;
use crate::oauth::callback::LOGIN_TIMEOUT_SECS;
use crate::oauth::{AuthError, browser, generate_pkce_pair, generate_state, wait_for_authorization_code};

// ============================================================================
// Constants
// ============================================================================

/// Authorization endpoint shown to the user.
pub const AUTHORIZE_URL: &str = "https://auth.openai.com/oauth/authorize";

/// Token exchange and refresh endpoint.
pub const TOKEN_URL: &str = "https://auth.openai.com/oauth/token";

/// Public client id used by the Codex CLI.
pub const CLIENT_ID: &str = "app_EMoamEEZ73f0CkXaXp7hrann";

/// Requested scopes.
pub const SCOPES: &str = "openid profile email offline_access";

/// Local callback listener port (the port the client id is registered for).
pub const CALLBACK_PORT: u16 = 1455;

/// Local callback path.
pub const CALLBACK_PATH: &str = "/auth/callback";

fn redirect_uri() -> String {
    format!("http://localhost:{CALLBACK_PORT}{CALLBACK_PATH}")
}

// ============================================================================
// Token Responses
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    /// Builds a credential, pulling the account id out of the JWT.
    fn into_credential(self, previous_refresh: Option<&str>) -> Credential {
        let account_id = extract_account_id(&self.access_token);
        if account_id.is_none() {
            warn!("Access token carries no ChatGPT account id");
        }

        let mut credential = Credential {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(String::from)),
            expires_at: self
                .expires_in
                .map(|secs| Credential::now_ms() + secs * 1000),
            extra: Default::default(),
        };
        if let Some(account_id) = account_id {
            credential.set_extra(ACCOUNT_ID_KEY, account_id);
        }
        credential
    }
}

// ============================================================================
// Login
// ============================================================================

/// Runs the Codex PKCE login flow and returns the new credential.
#[instrument(skip(http))]
pub async fn login(http: &HttpClient) -> Result<Credential, AuthError> {
    let pkce = generate_pkce_pair();
    let state = generate_state();

    let mut auth_url = Url::parse(AUTHORIZE_URL)
        .map_err(|e| AuthError::InvalidResponse(format!("bad authorize url: {e}")))?;
    auth_url
        .query_pairs_mut()
        .append_pair("client_id", CLIENT_ID)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", &redirect_uri())
        .append_pair("scope", SCOPES)
        .append_pair("code_challenge", &pkce.challenge)
        .append_pair("code_challenge_method", "S256")
        .append_pair("state", &state);

    println!();
    println!("Opening browser for ChatGPT OAuth login…");
    println!("If it doesn't open, visit:\n  {auth_url}");
    println!();
    browser::open_in_browser(auth_url.as_str());

    let code = wait_for_authorization_code(
        CALLBACK_PORT,
        CALLBACK_PATH,
        &state,
        Duration::from_secs(LOGIN_TIMEOUT_SECS),
    )
    .await?;

    debug!("Authorization code received, exchanging");
    let body = serde_json::json!({
        "grant_type": "authorization_code",
        "client_id": CLIENT_ID,
        "code": code,
        "redirect_uri": redirect_uri(),
        "code_verifier": pkce.verifier,
    });

    let token: TokenResponse = http
        .post_json("codex-oauth", TOKEN_URL, HeaderMap::new(), &body)
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

    info!("Codex OAuth login complete");
    Ok(token.into_credential(None))
}

// ============================================================================
// Refresh
// ============================================================================

/// Exchanges the refresh token for fresh credentials.
///
/// The account id is re-extracted from the new access token, since account
/// migrations can change it between refreshes.
#[instrument(skip(http, credential))]
pub async fn refresh_access_token(
    http: &HttpClient,
    credential: &Credential,
) -> Result<Credential, AuthError> {
    let Some(refresh_token) = credential.refresh_token.as_deref() else {
        return Err(AuthError::RefreshFailed("no refresh token stored".to_string()));
    };

    let body = serde_json::json!({
        "grant_type": "refresh_token",
        "client_id": CLIENT_ID,
        "refresh_token": refresh_token,
        "scope": SCOPES,
    });

    let token: TokenResponse = http
        .post_json("codex-oauth", TOKEN_URL, HeaderMap::new(), &body)
        .await
        .map_err(|e| match e {
            FetchError::Unauthenticated => {
                AuthError::RefreshFailed("refresh token rejected".to_string())
            }
            FetchError::Status { code, body } if (400..500).contains(&code) => {
                AuthError::RefreshFailed(format!("HTTP {code}: {body}"))
            }
            other => AuthError::TokenExchange(other.to_string()),
        })?;

    debug!("Codex token refreshed");
    Ok(token.into_credential(Some(refresh_token)))
}

// ============================================================================
// Tests
// ============================================================================
