//! Cursor usage fetcher.

use async_trait::async_trait;
use limitbar_core::{ProviderKind, UsagePayload};
use limitbar_fetch::{FetchContext, FetchError};
use limitbar_store::Credential;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue};

use super::parser::{CursorUsageResponse, to_payload};
use crate::subscription::SubscriptionApi;

/// Cursor usage endpoint.
pub const USAGE_URL: &str = "https://cursor.com/api/usage";

/// Primary environment variable for a session cookie.
pub const COOKIE_ENV: &str = "CURSOR_COOKIE";

/// Fallback environment variable.
pub const SESSION_TOKEN_ENV: &str = "CURSOR_SESSION_TOKEN";

/// Cursor subscription API.
///
/// No refresh override: cookies have no refresh protocol. A 401/403 from the
/// usage endpoint marks the cookie invalid (unauthenticated); anything else
/// stays a plain error.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorApi;

#[async_trait]
impl SubscriptionApi for CursorApi {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Cursor
    }

    fn fallback_credential(&self) -> Option<Credential> {
        [COOKIE_ENV, SESSION_TOKEN_ENV]
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|c| !c.is_empty()))
            .map(Credential::new)
    }

    async fn fetch_usage(
        &self,
        ctx: &FetchContext,
        credential: &Credential,
    ) -> Result<UsagePayload, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&credential.access_token).map_err(|_| {
                FetchError::InvalidResponse("cookie is not a valid header value".to_string())
            })?,
        );

        let response: CursorUsageResponse = ctx.http.get_json("cursor", USAGE_URL, headers).await?;
        Ok(to_payload(response))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_credential_env_resolution() {
        // One test so the env mutations cannot race each other.
        unsafe { std::env::set_var(SESSION_TOKEN_ENV, "env-cookie") };
        let credential = CursorApi.fallback_credential();
        assert_eq!(credential.unwrap().access_token, "env-cookie");

        // An empty primary falls through to the fallback variable.
        unsafe { std::env::set_var(COOKIE_ENV, "") };
        let credential = CursorApi.fallback_credential();
        assert_eq!(credential.unwrap().access_token, "env-cookie");

        unsafe { std::env::remove_var(SESSION_TOKEN_ENV) };
        let credential = CursorApi.fallback_credential();
        assert!(credential.is_none());

        unsafe { std::env::remove_var(COOKIE_ENV) };
    }
}
