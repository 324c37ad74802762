//! Claude usage/profile response parsing.

use chrono::{DateTime, Utc};
use limitbar_core::{Identity, UsagePayload, UsageWindow};
use serde::Deserialize;
use tracing::debug;

/// Minutes in the 5-hour session window.
const SESSION_WINDOW_MINUTES: u32 = 300;

/// Minutes in the 7-day rolling window.
const WEEKLY_WINDOW_MINUTES: u32 = 10_080;

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from the OAuth usage endpoint.
///
/// Every field is optional; a minimal response carrying only `five_hour` is
/// valid.
#[derive(Debug, Default, Deserialize)]
pub struct ClaudeUsageResponse {
    /// 5-hour session window.
    #[serde(default)]
    pub five_hour: Option<ClaudeWindow>,
    /// 7-day rolling window.
    #[serde(default)]
    pub seven_day: Option<ClaudeWindow>,
    /// 7-day Sonnet-tier window.
    #[serde(default)]
    pub seven_day_sonnet: Option<ClaudeWindow>,
}

/// One usage window from the API.
#[derive(Debug, Deserialize)]
pub struct ClaudeWindow {
    /// Percentage of the window used (0-100).
    #[serde(default)]
    pub utilization: Option<f64>,
    /// Reset time, RFC 3339.
    #[serde(default)]
    pub resets_at: Option<String>,
}

/// Response from the OAuth profile endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ClaudeProfileResponse {
    /// Account block.
    #[serde(default)]
    pub account: Option<ClaudeAccount>,
}

/// Account block of the profile response.
#[derive(Debug, Default, Deserialize)]
pub struct ClaudeAccount {
    /// Account email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Set on Pro subscriptions.
    #[serde(default)]
    pub has_claude_pro: Option<bool>,
    /// Set on Max subscriptions.
    #[serde(default)]
    pub has_claude_max: Option<bool>,
}

// ============================================================================
// Parsers
// ============================================================================

/// Combines usage and optional profile responses into a payload.
pub fn to_payload(
    usage: ClaudeUsageResponse,
    profile: Option<ClaudeProfileResponse>,
) -> UsagePayload {
    let primary = usage
        .five_hour
        .map(|w| parse_window(&w, SESSION_WINDOW_MINUTES));
    let secondary = usage
        .seven_day
        .map(|w| parse_window(&w, WEEKLY_WINDOW_MINUTES));
    let tertiary = usage
        .seven_day_sonnet
        .map(|w| parse_window(&w, WEEKLY_WINDOW_MINUTES));
    let tertiary_label = tertiary.as_ref().map(|_| "Sonnet".to_string());

    let identity = profile.and_then(|p| p.account).map(|account| Identity {
        plan: plan_label(&account),
        email: account.email,
    });

    debug!(
        has_primary = primary.is_some(),
        has_secondary = secondary.is_some(),
        has_tertiary = tertiary.is_some(),
        "Claude usage parsed"
    );

    UsagePayload::Subscription {
        primary,
        secondary,
        tertiary,
        tertiary_label,
        identity,
    }
}

fn parse_window(window: &ClaudeWindow, window_minutes: u32) -> UsageWindow {
    UsageWindow {
        used_percent: window.utilization.unwrap_or(0.0),
        window_minutes: Some(window_minutes),
        resets_at: window.resets_at.as_deref().and_then(parse_reset),
    }
}

fn parse_reset(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn plan_label(account: &ClaudeAccount) -> Option<String> {
    if account.has_claude_max == Some(true) {
        Some("Claude Max".to_string())
    } else if account.has_claude_pro == Some(true) {
        Some("Claude Pro".to_string())
    } else {
        None
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_USAGE: &str = r#"{
        "five_hour": {"utilization": 42.5, "resets_at": "2026-02-16T06:00:00Z"},
        "seven_day": {"utilization": 15.0, "resets_at": "2026-02-22T00:00:00Z"},
        "seven_day_sonnet": {"utilization": 8.0, "resets_at": "2026-02-22T00:00:00Z"}
    }"#;

    #[test]
    fn test_parse_all_windows() {
        let usage: ClaudeUsageResponse = serde_json::from_str(SAMPLE_USAGE).unwrap();
        let profile: ClaudeProfileResponse = serde_json::from_str(
            r#"{"account": {"email": "test@test.com", "has_claude_max": true}, "organization": {}}"#,
        )
        .unwrap();

        let payload = to_payload(usage, Some(profile));
        let UsagePayload::Subscription {
            primary,
            secondary,
            tertiary,
            tertiary_label,
            identity,
        } = payload
        else {
            panic!("wrong payload kind");
        };

        let primary = primary.unwrap();
        assert_eq!(primary.used_percent, 42.5);
        assert_eq!(primary.window_minutes, Some(300));
        assert!(primary.resets_at.is_some());

        let secondary = secondary.unwrap();
        assert_eq!(secondary.used_percent, 15.0);
        assert_eq!(secondary.window_minutes, Some(10080));

        assert_eq!(tertiary.unwrap().used_percent, 8.0);
        assert_eq!(tertiary_label.as_deref(), Some("Sonnet"));

        let identity = identity.unwrap();
        assert_eq!(identity.email.as_deref(), Some("test@test.com"));
        assert_eq!(identity.plan.as_deref(), Some("Claude Max"));
    }

    #[test]
    fn test_parse_minimal_response() {
        let usage: ClaudeUsageResponse =
            serde_json::from_str(r#"{"five_hour": {"utilization": 10.0}}"#).unwrap();

        let payload = to_payload(usage, None);
        let UsagePayload::Subscription {
            primary,
            secondary,
            tertiary,
            identity,
            ..
        } = payload
        else {
            panic!("wrong payload kind");
        };

        let primary = primary.unwrap();
        assert_eq!(primary.used_percent, 10.0);
        assert!(primary.resets_at.is_none());
        assert!(secondary.is_none());
        assert!(tertiary.is_none());
        assert!(identity.is_none());
    }

    #[test]
    fn test_parse_empty_response() {
        let usage: ClaudeUsageResponse = serde_json::from_str("{}").unwrap();
        let payload = to_payload(usage, None);
        assert!(!payload.has_data());
    }

    #[test]
    fn test_missing_utilization_defaults_to_zero() {
        let usage: ClaudeUsageResponse =
            serde_json::from_str(r#"{"five_hour": {"resets_at": "2026-02-16T06:00:00Z"}}"#)
                .unwrap();
        let payload = to_payload(usage, None);
        let UsagePayload::Subscription { primary, .. } = payload else {
            panic!("wrong payload kind");
        };
        assert_eq!(primary.unwrap().used_percent, 0.0);
    }

    #[test]
    fn test_pro_plan_label() {
        let account = ClaudeAccount {
            email: None,
            has_claude_pro: Some(true),
            has_claude_max: None,
        };
        assert_eq!(plan_label(&account).as_deref(), Some("Claude Pro"));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        // The upstream schema is not stable; extra blocks must not break us.
        let usage: ClaudeUsageResponse = serde_json::from_str(
            r#"{"five_hour": {"utilization": 1.0}, "extra_usage": {"used_credits": 350}}"#,
        )
        .unwrap();
        assert!(usage.five_hour.is_some());
    }
}
