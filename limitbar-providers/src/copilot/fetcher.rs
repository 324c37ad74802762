//! Copilot usage fetcher.

use async_trait::async_trait;
use limitbar_core::{ProviderKind, UsagePayload};
use limitbar_fetch::{FetchContext, FetchError};
use limitbar_store::Credential;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};

use super::parser::{CopilotUserResponse, to_payload};
use crate::subscription::SubscriptionApi;

/// GitHub's internal Copilot user endpoint.
pub const USAGE_URL: &str = "https://api.github.com/copilot_internal/user";

/// Copilot subscription API.
///
/// No refresh override: device-flow tokens have no refresh protocol, so the
/// default no-op applies and a revoked token surfaces as a rejected fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopilotApi;

#[async_trait]
impl SubscriptionApi for CopilotApi {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Copilot
    }

    async fn fetch_usage(
        &self,
        ctx: &FetchContext,
        credential: &Credential,
    ) -> Result<UsagePayload, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("token {}", credential.access_token)).map_err(
                |_| FetchError::InvalidResponse("access token is not a valid header".to_string()),
            )?,
        );

        let response: CopilotUserResponse =
            ctx.http.get_json("copilot", USAGE_URL, headers).await?;
        Ok(to_payload(response))
    }
}
