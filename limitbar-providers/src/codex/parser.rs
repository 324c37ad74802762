//! Codex `/wham/usage` response parsing.

use chrono::{DateTime, TimeZone, Utc};
use limitbar_core::{Identity, UsagePayload, UsageWindow};
use serde::Deserialize;

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from the wham usage endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct WhamUsageResponse {
    /// Plan type (`plus`, `pro`, `free`, ...).
    #[serde(default)]
    pub plan_type: Option<String>,
    /// Rate-limit windows.
    #[serde(default)]
    pub rate_limit: Option<WhamRateLimit>,
}

/// Rate-limit block with up to two windows.
#[derive(Debug, Default, Deserialize)]
pub struct WhamRateLimit {
    /// Session window.
    #[serde(default)]
    pub primary_window: Option<WhamWindow>,
    /// Weekly window.
    #[serde(default)]
    pub secondary_window: Option<WhamWindow>,
}

/// One rate-limit window.
#[derive(Debug, Deserialize)]
pub struct WhamWindow {
    /// Percentage of the window used (0-100).
    #[serde(default)]
    pub used_percent: Option<f64>,
    /// Reset time as epoch seconds.
    #[serde(default)]
    pub reset_at: Option<i64>,
    /// Window duration in seconds.
    #[serde(default)]
    pub limit_window_seconds: Option<i64>,
}

// ============================================================================
// Parser
// ============================================================================

/// Converts the wham response into a payload.
pub fn to_payload(response: WhamUsageResponse) -> UsagePayload {
    let (primary, secondary) = match response.rate_limit {
        Some(rate_limit) => (
            rate_limit.primary_window.map(|w| parse_window(&w)),
            rate_limit.secondary_window.map(|w| parse_window(&w)),
        ),
        None => (None, None),
    };

    let identity = response.plan_type.as_deref().map(|plan| Identity {
        email: None,
        plan: Some(plan_label(plan)),
    });

    UsagePayload::Subscription {
        primary,
        secondary,
        tertiary: None,
        tertiary_label: None,
        identity,
    }
}

fn parse_window(window: &WhamWindow) -> UsageWindow {
    UsageWindow {
        used_percent: window.used_percent.unwrap_or(0.0),
        window_minutes: window
            .limit_window_seconds
            .and_then(|secs| u32::try_from(secs / 60).ok()),
        resets_at: window.reset_at.and_then(parse_reset),
    }
}

fn parse_reset(epoch_secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(epoch_secs, 0).single()
}

/// Maps the raw plan type to a display label.
fn plan_label(plan_type: &str) -> String {
    let mut label = String::from("ChatGPT ");
    let mut chars = plan_type.chars();
    match chars.next() {
        Some(first) => {
            label.extend(first.to_uppercase());
            label.push_str(chars.as_str());
        }
        None => label.push_str("Unknown"),
    }
    label
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"{
        "plan_type": "plus",
        "rate_limit": {
            "primary_window": {
                "used_percent": 35,
                "reset_at": 1771200000,
                "limit_window_seconds": 18000
            },
            "secondary_window": {
                "used_percent": 12,
                "reset_at": 1771920000,
                "limit_window_seconds": 604800
            }
        },
        "credits": {"has_credits": true, "unlimited": false, "balance": 42.50}
    }"#;

    #[test]
    fn test_parse_full_response() {
        let response: WhamUsageResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
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

        // 18000 seconds = 300 minutes.
        let primary = primary.unwrap();
        assert_eq!(primary.used_percent, 35.0);
        assert_eq!(primary.window_minutes, Some(300));
        assert!(primary.resets_at.is_some());

        // 604800 seconds = 10080 minutes.
        let secondary = secondary.unwrap();
        assert_eq!(secondary.used_percent, 12.0);
        assert_eq!(secondary.window_minutes, Some(10080));

        assert_eq!(identity.unwrap().plan.as_deref(), Some("ChatGPT Plus"));
    }

    #[test]
    fn test_parse_pro_plan_single_window() {
        let json = r#"{
            "plan_type": "pro",
            "rate_limit": {
                "primary_window": {
                    "used_percent": 50,
                    "reset_at": 1771200000,
                    "limit_window_seconds": 18000
                }
            }
        }"#;
        let response: WhamUsageResponse = serde_json::from_str(json).unwrap();
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
        assert_eq!(primary.unwrap().used_percent, 50.0);
        assert!(secondary.is_none());
        assert_eq!(identity.unwrap().plan.as_deref(), Some("ChatGPT Pro"));
    }

    #[test]
    fn test_parse_no_rate_limit() {
        let response: WhamUsageResponse =
            serde_json::from_str(r#"{"plan_type": "free"}"#).unwrap();
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
        assert!(primary.is_none());
        assert!(secondary.is_none());
        assert_eq!(identity.unwrap().plan.as_deref(), Some("ChatGPT Free"));
    }

    #[test]
    fn test_parse_empty_response() {
        let response: WhamUsageResponse = serde_json::from_str("{}").unwrap();
        let payload = to_payload(response);
        assert!(!payload.has_data());
    }
}
