//! Claude interactive login - PKCE OAuth flow - and token refresh.

use limitbar_fetch::{FetchError, HttpClient};
use limitbar_store::Credential;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

use crate::oauth::callback::LOGIN_TIMEOUT_SECS;
use crate::oauth::{AuthError, browser, generate_pkce_pair, generate_state, wait_for_authorization_code};

// ============================================================================
// Constants
// ============================================================================

/// Authorization endpoint shown to the user.
pub const AUTHORIZE_URL: &str = "https://claude.ai/oauth/authorize";

/// Token exchange and refresh endpoint.
pub const TOKEN_URL: &str = "https://api.anthropic.com/v1/oauth/token";

/// Public client id used by Claude tooling.
pub const CLIENT_ID: &str = "9d1c250a-e61b-44d9-88ed-5944d1962f5e";

/// Scopes required for the usage API.
pub const SCOPES: &str = "org:create_api_key user:profile user:inference";

/// Local callback listener port.
pub const CALLBACK_PORT: u16 = 54545;

/// Local callback path.
pub const CALLBACK_PATH: &str = "/callback";

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
    fn into_credential(self, previous_refresh: Option<&str>) -> Credential {
        Credential {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(String::from)),
            expires_at: self
                .expires_in
                .map(|secs| Credential::now_ms() + secs * 1000),
            extra: Default::default(),
        }
    }
}

// ============================================================================
// Login
// ============================================================================

/// Runs the Claude PKCE login flow and returns the new credential.
///
/// Opens the consent screen in the browser (printing the URL regardless),
/// waits up to 120s for the localhost callback, and exchanges the code.
#[instrument(skip(http))]
pub async fn login(http: &HttpClient) -> Result<Credential, AuthError> {
    let pkce = generate_pkce_pair();
    let state = generate_state();

    let mut auth_url = Url::parse(AUTHORIZE_URL)
        .map_err(|e| AuthError::InvalidResponse(format!("bad authorize url: {e}")))?;
    auth_url
        .query_pairs_mut()
        .append_pair("code", "true")
        .append_pair("client_id", CLIENT_ID)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", &redirect_uri())
        .append_pair("scope", SCOPES)
        .append_pair("code_challenge", &pkce.challenge)
        .append_pair("code_challenge_method", "S256")
        .append_pair("state", &state);

    println!();
    println!("Opening browser for Claude OAuth login…");
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
        "state": state,
    });

    let token: TokenResponse = http
        .post_json("claude-oauth", TOKEN_URL, HeaderMap::new(), &body)
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

    info!("Claude OAuth login complete");
    Ok(token.into_credential(None))
}

// ============================================================================
// Refresh
// ============================================================================

/// Exchanges the refresh token for fresh credentials.
///
/// A 4xx from the token endpoint means the refresh token was revoked or
/// expired - callers clear the credential and surface unauthenticated.
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
    });

    let token: TokenResponse = http
        .post_json("claude-oauth", TOKEN_URL, HeaderMap::new(), &body)
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

    debug!("Claude token refreshed");
    Ok(token.into_credential(Some(refresh_token)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_to_credential() {
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token": "new-access", "refresh_token": "new-refresh", "expires_in": 7200}"#,
        )
        .unwrap();

        let cred = token.into_credential(Some("old-refresh"));
        assert_eq!(cred.access_token, "new-access");
        assert_eq!(cred.refresh_token.as_deref(), Some("new-refresh"));
        assert!(cred.expires_at.unwrap() > Credential::now_ms());
    }

    #[test]
    fn test_token_response_keeps_previous_refresh_token() {
        // Some token endpoints rotate the refresh token only sometimes.
        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token": "new-access", "expires_in": 7200}"#).unwrap();

        let cred = token.into_credential(Some("old-refresh"));
        assert_eq!(cred.refresh_token.as_deref(), Some("old-refresh"));
    }

    #[test]
    fn test_redirect_uri_matches_listener() {
        assert_eq!(redirect_uri(), "http://localhost:54545/callback");
    }
}
