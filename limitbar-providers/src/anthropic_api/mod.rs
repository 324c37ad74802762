//! Anthropic organization billing provider (admin API key).
//!
//! Sums the cost-report buckets for the current month into a single
//! month-to-date spend figure. Amounts arrive as decimal strings; numbers
//! are accepted too since the schema is not contractually stable.

use async_trait::async_trait;
use chrono::{Datelike, TimeZone, Utc};
use limitbar_core::ProviderKind;
use limitbar_fetch::{FetchContext, FetchError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use crate::api_key::BillingApi;

/// Organization cost-report endpoint.
pub const COST_REPORT_URL: &str = "https://api.anthropic.com/v1/organizations/cost_report";

/// API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Primary environment variable for the admin key.
pub const ADMIN_KEY_ENV: &str = "ANTHROPIC_ADMIN_KEY";

/// Fallback environment variable.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");
const VERSION_HEADER: HeaderName = HeaderName::from_static("anthropic-version");

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from the cost-report endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CostReportResponse {
    /// Time buckets of cost results.
    #[serde(default)]
    pub data: Vec<CostReportBucket>,
}

/// One time bucket of cost results.
#[derive(Debug, Default, Deserialize)]
pub struct CostReportBucket {
    /// Line items within the bucket.
    #[serde(default)]
    pub results: Vec<CostReportResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CostReportResult {
    /// Decimal string in the official schema; numbers tolerated.
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
}

/// Sums every bucket's results; unparsable amounts count as zero.
pub fn total_spend(response: &CostReportResponse) -> f64 {
    response
        .data
        .iter()
        .flat_map(|bucket| &bucket.results)
        .filter_map(|result| result.amount.as_ref())
        .filter_map(parse_amount)
        .sum()
}

fn parse_amount(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Returns the first instant of the current UTC month, RFC 3339.
fn month_start_rfc3339() -> String {
    let now = Utc::now();
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .map_or_else(String::new, |dt| dt.to_rfc3339())
}

// ============================================================================
// Billing API
// ============================================================================

/// Anthropic billing API.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicBillingApi;

#[async_trait]
impl BillingApi for AnthropicBillingApi {
    fn kind(&self) -> ProviderKind {
        ProviderKind::AnthropicApi
    }

    fn env_vars(&self) -> (&'static str, &'static str) {
        (ADMIN_KEY_ENV, API_KEY_ENV)
    }

    async fn fetch_spend(&self, ctx: &FetchContext, key: &str) -> Result<f64, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(key).map_err(|_| {
                FetchError::InvalidResponse("API key is not a valid header value".to_string())
            })?,
        );
        headers.insert(VERSION_HEADER, HeaderValue::from_static(ANTHROPIC_VERSION));

        let url = format!(
            "{COST_REPORT_URL}?starting_at={}",
            month_start_rfc3339()
        );
        let response: CostReportResponse =
            ctx.http.get_json("anthropic-api", &url, headers).await?;

        let spend = total_spend(&response);
        debug!(spend, buckets = response.data.len(), "Anthropic costs summed");
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
    fn test_total_spend_parses_string_amounts() {
        let json = r#"{
            "data": [
                {"results": [{"amount": "10.00", "currency": "USD"}]},
                {"results": [{"amount": "2.50", "currency": "USD"}]}
            ]
        }"#;
        let response: CostReportResponse = serde_json::from_str(json).unwrap();
        assert!((total_spend(&response) - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_total_spend_accepts_numeric_amounts() {
        let json = r#"{"data": [{"results": [{"amount": 3.25}]}]}"#;
        let response: CostReportResponse = serde_json::from_str(json).unwrap();
        assert!((total_spend(&response) - 3.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_total_spend_skips_garbage_amounts() {
        let json = r#"{"data": [{"results": [{"amount": "n/a"}, {"amount": "1.00"}]}]}"#;
        let response: CostReportResponse = serde_json::from_str(json).unwrap();
        assert!((total_spend(&response) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_response_is_zero_spend() {
        let response: CostReportResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(total_spend(&response), 0.0);
    }

    #[test]
    fn test_month_start_is_rfc3339() {
        let start = month_start_rfc3339();
        assert!(chrono::DateTime::parse_from_rfc3339(&start).is_ok());
    }
}
