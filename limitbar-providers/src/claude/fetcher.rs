//! Claude usage fetcher.

use async_trait::async_trait;
use limitbar_core::{ProviderKind, UsagePayload};
use limitbar_fetch::{FetchContext, FetchError, HttpClient};
use limitbar_store::Credential;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;

use super::login::refresh_access_token;
use super::parser::{ClaudeProfileResponse, ClaudeUsageResponse, to_payload};
use crate::oauth::AuthError;
use crate::subscription::SubscriptionApi;

/// OAuth usage endpoint.
pub const USAGE_URL: &str = "https://api.anthropic.com/api/oauth/usage";

/// OAuth profile endpoint (identity; best effort).
pub const PROFILE_URL: &str = "https://api.anthropic.com/api/oauth/profile";

/// Claude subscription API.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaudeApi;

fn bearer_headers(credential: &Credential) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&format!("Bearer {}", credential.access_token))
        .map_err(|_| FetchError::InvalidResponse("access token is not a valid header".to_string()))?;
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

#[async_trait]
impl SubscriptionApi for ClaudeApi {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    async fn refresh(
        &self,
        http: &HttpClient,
        credential: &Credential,
    ) -> Result<Credential, AuthError> {
        refresh_access_token(http, credential).await
    }

    async fn fetch_usage(
        &self,
        ctx: &FetchContext,
        credential: &Credential,
    ) -> Result<UsagePayload, FetchError> {
        let usage: ClaudeUsageResponse = ctx
            .http
            .get_json("claude", USAGE_URL, bearer_headers(credential)?)
            .await?;

        // Identity is nice to have; a profile failure never fails the fetch.
        let profile = match ctx
            .http
            .get_json::<ClaudeProfileResponse>("claude", PROFILE_URL, bearer_headers(credential)?)
            .await
        {
            Ok(profile) => Some(profile),
            Err(e) => {
                debug!(error = %e, "Claude profile unavailable");
                None
            }
        };

        Ok(to_payload(usage, profile))
    }
}
