//! Codex usage fetcher.

use async_trait::async_trait;
use limitbar_core::{ProviderKind, UsagePayload};
use limitbar_fetch::{FetchContext, FetchError, HttpClient};
use limitbar_store::Credential;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use super::ACCOUNT_ID_KEY;
use super::login::refresh_access_token;
use super::parser::{WhamUsageResponse, to_payload};
use crate::oauth::AuthError;
use crate::subscription::SubscriptionApi;

/// ChatGPT backend usage endpoint.
pub const USAGE_URL: &str = "https://chatgpt.com/backend-api/wham/usage";

/// Header naming the ChatGPT account the request is scoped to.
const ACCOUNT_HEADER: HeaderName = HeaderName::from_static("chatgpt-account-id");

/// Codex subscription API.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodexApi;

#[async_trait]
impl SubscriptionApi for CodexApi {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Codex
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
        // A credential without an account id cannot address the usage API;
        // treat it the same as an absent credential.
        let Some(account_id) = credential.extra_str(ACCOUNT_ID_KEY) else {
            debug!("Codex credential has no account id");
            return Err(FetchError::Unauthenticated);
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", credential.access_token)).map_err(
                |_| FetchError::InvalidResponse("access token is not a valid header".to_string()),
            )?,
        );
        headers.insert(
            ACCOUNT_HEADER,
            HeaderValue::from_str(account_id).map_err(|_| {
                FetchError::InvalidResponse("account id is not a valid header".to_string())
            })?,
        );

        let response: WhamUsageResponse = ctx.http.get_json("codex", USAGE_URL, headers).await?;
        Ok(to_payload(response))
    }
}
