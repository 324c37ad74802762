//! Cursor usage response parsing.
//!
//! The usage API reports request counts against limits per model tier; the
//! field names have drifted over time, so aliases cover the known variants
//! and everything is optional.

use chrono::{DateTime, Utc};
use limitbar_core::{Identity, UsagePayload, UsageWindow};
use serde::Deserialize;

/// Minutes in the monthly billing window.
const MONTHLY_WINDOW_MINUTES: u32 = 43_200;

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from the Cursor usage endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorUsageResponse {
    /// Premium/fast requests used.
    #[serde(default, alias = "numRequests", alias = "gpt4_requests")]
    pub premium_requests: Option<u64>,

    /// Premium request limit.
    #[serde(default, alias = "maxRequests", alias = "gpt4_limit")]
    pub premium_limit: Option<u64>,

    /// Slow requests used.
    #[serde(default, alias = "numSlowRequests", alias = "slow_requests")]
    pub slow_requests: Option<u64>,

    /// Slow request limit.
    #[serde(default, alias = "maxSlowRequests", alias = "slow_limit")]
    pub slow_limit: Option<u64>,

    /// Billing period end / reset time.
    #[serde(default, alias = "endOfMonth", alias = "period_end")]
    pub period_end: Option<String>,

    /// User's plan name.
    #[serde(default)]
    pub plan: Option<String>,

    /// User email.
    #[serde(default)]
    pub email: Option<String>,
}

// ============================================================================
// Parser
// ============================================================================

/// Converts the usage response into a payload.
pub fn to_payload(response: CursorUsageResponse) -> UsagePayload {
    let resets_at = response.period_end.as_deref().and_then(parse_period_end);

    let primary = percent(response.premium_requests, response.premium_limit).map(|used_percent| {
        UsageWindow {
            used_percent,
            window_minutes: Some(MONTHLY_WINDOW_MINUTES),
            resets_at,
        }
    });

    let secondary = percent(response.slow_requests, response.slow_limit).map(|used_percent| {
        UsageWindow {
            used_percent,
            window_minutes: Some(MONTHLY_WINDOW_MINUTES),
            resets_at,
        }
    });

    let identity = (response.email.is_some() || response.plan.is_some()).then(|| Identity {
        email: response.email.clone(),
        plan: response.plan.clone(),
    });

    UsagePayload::Subscription {
        primary,
        secondary,
        tertiary: None,
        tertiary_label: None,
        identity,
    }
}

/// Computes a used percentage from a count/limit pair.
fn percent(used: Option<u64>, limit: Option<u64>) -> Option<f64> {
    match (used, limit) {
        (Some(used), Some(limit)) if limit > 0 => {
            Some((used as f64 / limit as f64) * 100.0)
        }
        _ => None,
    }
}

fn parse_period_end(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case_response() {
        let json = r#"{
            "numRequests": 150,
            "maxRequests": 500,
            "numSlowRequests": 20,
            "maxSlowRequests": 100,
            "endOfMonth": "2026-03-01T00:00:00Z",
            "plan": "Pro",
            "email": "user@example.com"
        }"#;
        let response: CursorUsageResponse = serde_json::from_str(json).unwrap();
        let payload = to_payload(response);

        let UsagePayload::Subscription {
            primary,
            secondary,
            identity,
            ..
        } = payload
        else {
            panic!("wrong payload kind");
        };

        assert!((primary.unwrap().used_percent - 30.0).abs() < f64::EPSILON);
        assert!((secondary.unwrap().used_percent - 20.0).abs() < f64::EPSILON);

        let identity = identity.unwrap();
        assert_eq!(identity.email.as_deref(), Some("user@example.com"));
        assert_eq!(identity.plan.as_deref(), Some("Pro"));
    }

    #[test]
    fn test_zero_limit_yields_no_window() {
        let json = r#"{"numRequests": 10, "maxRequests": 0}"#;
        let response: CursorUsageResponse = serde_json::from_str(json).unwrap();
        let payload = to_payload(response);
        assert!(!payload.has_data());
    }

    #[test]
    fn test_parse_empty_response() {
        let response: CursorUsageResponse = serde_json::from_str("{}").unwrap();
        let payload = to_payload(response);
        assert!(!payload.has_data());
    }

    #[test]
    fn test_period_end_formats() {
        assert!(parse_period_end("2026-03-01T00:00:00Z").is_some());
        assert!(parse_period_end("2026-03-01").is_some());
        assert!(parse_period_end("next month").is_none());
    }
}
