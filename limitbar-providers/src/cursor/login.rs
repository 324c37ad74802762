//! Cursor interactive login - cookie paste flow.

use limitbar_fetch::HttpClient;
use limitbar_store::Credential;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::EMAIL_KEY;
use crate::oauth::AuthError;

/// Endpoint used to verify a pasted cookie.
pub const AUTH_ME_URL: &str = "https://cursor.com/api/auth/me";

/// Session cookie names we recognize.
const VALID_COOKIE_NAMES: &[&str] = &[
    "WorkosCursorSessionToken",
    "__Secure-next-auth.session-token",
    "next-auth.session-token",
];

#[derive(Debug, Deserialize)]
struct AuthMeResponse {
    #[serde(default)]
    email: Option<String>,
}

// ============================================================================
// Login
// ============================================================================

/// Runs the cookie-paste login flow and returns the new credential.
///
/// The cookie is validated with a best-effort probe to `/api/auth/me`; a
/// failed probe keeps the cookie with a warning, since expiry will surface
/// on the next fetch anyway.
#[instrument(skip(http))]
pub async fn login(http: &HttpClient) -> Result<Credential, AuthError> {
    println!();
    println!("To get your Cursor session cookie:");
    println!();
    println!("  1. Open https://cursor.com/dashboard in your browser");
    println!("  2. Open DevTools (F12) → Network tab → refresh the page");
    println!("  3. Click any request to cursor.com");
    println!("  4. Find the Cookie header and copy its value");
    println!();

    let cookie = prompt("Cookie: ")?;
    let cookie = normalize_cookie(&cookie);
    if cookie.is_empty() {
        return Err(AuthError::Cancelled);
    }

    if !has_known_session_cookie(&cookie) {
        eprintln!("⚠ Warning: cookie does not contain a known Cursor session token.");
        eprintln!("  Expected one of: {}", VALID_COOKIE_NAMES.join(", "));
        let answer = prompt("Save anyway? [y/N] ")?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            return Err(AuthError::Cancelled);
        }
    }

    let mut credential = Credential::new(cookie.clone());

    match verify_cookie(http, &cookie).await {
        Some(email) => {
            println!("✓ Verified — logged in as {email}");
            credential.set_extra(EMAIL_KEY, email);
        }
        None => println!("⚠ Could not verify cookie (will try on next fetch)."),
    }

    info!("Cursor cookie captured");
    Ok(credential)
}

/// Strips a copied `Cookie:` header prefix and surrounding whitespace.
pub fn normalize_cookie(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_prefix = trimmed
        .strip_prefix("Cookie:")
        .or_else(|| trimmed.strip_prefix("cookie:"))
        .unwrap_or(trimmed);
    without_prefix.trim().to_string()
}

/// Returns true when the cookie contains a recognized session token name.
pub fn has_known_session_cookie(cookie: &str) -> bool {
    VALID_COOKIE_NAMES.iter().any(|name| cookie.contains(name))
}

/// Fetches the account email to verify the cookie; best effort.
async fn verify_cookie(http: &HttpClient, cookie: &str) -> Option<String> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(COOKIE, HeaderValue::from_str(cookie).ok()?);

    match http
        .get_json::<AuthMeResponse>("cursor-login", AUTH_ME_URL, headers)
        .await
    {
        Ok(response) => response.email,
        Err(e) => {
            debug!(error = %e, "Cookie verification failed");
            None
        }
    }
}

fn prompt(message: &str) -> Result<String, AuthError> {
    use std::io::Write;

    print!("{message}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    let read = std::io::stdin().read_line(&mut line)?;
    if read == 0 {
        // EOF - user closed stdin.
        return Err(AuthError::Cancelled);
    }
    Ok(line.trim().to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_header_prefix() {
        assert_eq!(
            normalize_cookie("Cookie: WorkosCursorSessionToken=abc"),
            "WorkosCursorSessionToken=abc"
        );
        assert_eq!(
            normalize_cookie("cookie:  next-auth.session-token=x "),
            "next-auth.session-token=x"
        );
        assert_eq!(normalize_cookie("  plain=value  "), "plain=value");
    }

    #[test]
    fn test_known_session_cookie_detection() {
        assert!(has_known_session_cookie("a=1; WorkosCursorSessionToken=tok"));
        assert!(has_known_session_cookie("__Secure-next-auth.session-token=tok"));
        assert!(!has_known_session_cookie("ga=tracking; theme=dark"));
    }
}
