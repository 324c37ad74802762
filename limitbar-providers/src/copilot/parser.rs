//! Copilot usage response parsing.
//!
//! The internal user endpoint reports quota snapshots with a
//! `percent_remaining` per pool; the premium-interactions pool is the one
//! users watch.

use chrono::{DateTime, NaiveDate, Utc};
use limitbar_core::{Identity, UsagePayload, UsageWindow};
use serde::Deserialize;

/// Minutes in the monthly quota window.
const MONTHLY_WINDOW_MINUTES: u32 = 43_200;

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from the Copilot internal user endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CopilotUserResponse {
    /// Plan name (`individual`, `business`, ...).
    #[serde(default)]
    pub copilot_plan: Option<String>,
    /// Date the monthly quota resets (`YYYY-MM-DD`).
    #[serde(default)]
    pub quota_reset_date: Option<String>,
    /// Per-pool quota snapshots.
    #[serde(default)]
    pub quota_snapshots: Option<QuotaSnapshots>,
}

/// Per-pool quota snapshots.
#[derive(Debug, Default, Deserialize)]
pub struct QuotaSnapshots {
    /// Premium interactions pool - the one users watch.
    #[serde(default)]
    pub premium_interactions: Option<QuotaSnapshot>,
    /// Chat pool.
    #[serde(default)]
    pub chat: Option<QuotaSnapshot>,
}

/// One quota pool.
#[derive(Debug, Default, Deserialize)]
pub struct QuotaSnapshot {
    /// Percentage of the pool still available (0-100).
    #[serde(default)]
    pub percent_remaining: Option<f64>,
    /// True when the pool has no limit.
    #[serde(default)]
    pub unlimited: Option<bool>,
}

// ============================================================================
// Parser
// ============================================================================

/// Converts the user response into a payload.
pub fn to_payload(response: CopilotUserResponse) -> UsagePayload {
    let resets_at = response.quota_reset_date.as_deref().and_then(parse_reset_date);

    let primary = response
        .quota_snapshots
        .and_then(|snapshots| snapshots.premium_interactions)
        .filter(|snapshot| snapshot.unlimited != Some(true))
        .map(|snapshot| UsageWindow {
            used_percent: 100.0 - snapshot.percent_remaining.unwrap_or(100.0),
            window_minutes: Some(MONTHLY_WINDOW_MINUTES),
            resets_at,
        });

    let identity = response.copilot_plan.as_deref().map(|plan| Identity {
        email: None,
        plan: Some(plan_label(plan)),
    });

    UsagePayload::Subscription {
        primary,
        secondary: None,
        tertiary: None,
        tertiary_label: None,
        identity,
    }
}

fn parse_reset_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}

fn plan_label(plan: &str) -> String {
    let mut label = String::from("Copilot ");
    let mut chars = plan.chars();
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
