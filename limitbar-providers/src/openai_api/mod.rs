//! OpenAI organization billing provider (admin API key).
//!
//! Sums the organization costs buckets for the current month into a single
//! month-to-date spend figure.

use async_trait::async_trait;
use chrono::{Datelike, TimeZone, Utc};
use limitbar_core::ProviderKind;
use limitbar_fetch::{FetchContext, FetchError};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use crate::api_key::BillingApi;

/// Organization costs endpoint.
pub const COSTS_URL: &str = "https://api.openai.com/v1/organization/costs";

/// Primary environment variable for the admin key.
pub const ADMIN_KEY_ENV: &str = "OPENAI_ADMIN_KEY";

/// Fallback environment variable.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from the organization costs endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CostsResponse {
    /// Daily cost buckets.
    #[serde(default)]
    pub data: Vec<CostBucket>,
}

/// One time bucket of cost results.
#[derive(Debug, Default, Deserialize)]
pub struct CostBucket {
    /// Line items within the bucket.
    #[serde(default)]
    pub results: Vec<CostResult>,
}

/// One cost line item.
#[derive(Debug, Default, Deserialize)]
pub struct CostResult {
    /// The cost amount.
    #[serde(default)]
    pub amount: Option<CostAmount>,
}

/// A cost amount.
#[derive(Debug, Default, Deserialize)]
pub struct CostAmount {
    /// Value in USD.
    #[serde(default)]
    pub value: Option<f64>,
}

/// Sums every bucket's results; missing amounts count as zero.
pub fn total_spend(response: &CostsResponse) -> f64 {
    response
        .data
        .iter()
        .flat_map(|bucket| &bucket.results)
        .filter_map(|result| result.amount.as_ref())
        .filter_map(|amount| amount.value)
        .sum()
}

/// Returns the first instant of the current UTC month as epoch seconds.
fn month_start_epoch() -> i64 {
    let now = Utc::now();
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .map_or(0, |dt| dt.timestamp())
}

// ============================================================================
// Billing API
// ============================================================================

/// OpenAI billing API.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenaiBillingApi;

#[async_trait]
impl BillingApi for OpenaiBillingApi {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenaiApi
    }

    fn env_vars(&self) -> (&'static str, &'static str) {
        (ADMIN_KEY_ENV, API_KEY_ENV)
    }

    async fn fetch_spend(&self, ctx: &FetchContext, key: &str) -> Result<f64, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
                FetchError::InvalidResponse("API key is not a valid header value".to_string())
            })?,
        );

        let url = format!(
            "{COSTS_URL}?start_time={}&limit=31",
            month_start_epoch()
        );
        let response: CostsResponse = ctx.http.get_json("openai-api", &url, headers).await?;

        let spend = total_spend(&response);
        debug!(spend, buckets = response.data.len(), "OpenAI costs summed");
        Ok(spend)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_spend_sums_buckets() {
        let json = r#"{
            "data": [
                {"results": [{"amount": {"value": 4.25, "currency": "usd"}}]},
                {"results": [{"amount": {"value": 8.25, "currency": "usd"}}, {"amount": {"value": 0.0}}]}
            ]
        }"#;
        let response: CostsResponse = serde_json::from_str(json).unwrap();
        assert!((total_spend(&response) - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_total_spend_tolerates_missing_fields() {
        let json = r#"{
            "data": [
                {"results": [{}]},
                {"results": [{"amount": {}}]},
                {}
            ]
        }"#;
        let response: CostsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(total_spend(&response), 0.0);
    }

    #[test]
    fn test_empty_response_is_zero_spend() {
        let response: CostsResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(total_spend(&response), 0.0);
    }

    #[test]
    fn test_month_start_is_in_the_past() {
        let start = month_start_epoch();
        assert!(start > 0);
        assert!(start <= Utc::now().timestamp());
    }
}
