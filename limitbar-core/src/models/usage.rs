//! Usage payload types.
//!
//! - [`UsageWindow`] - One rate-limit window (session, weekly, tier)
//! - [`UsagePayload`] - Subscription windows or API spend
//! - [`SpendUsage`] - Month-to-date spend against an optional budget

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::provider::Identity;

// ============================================================================
// Usage Window
// ============================================================================

/// A single rate-limit window (e.g. 5-hour session, 7-day rolling).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageWindow {
    /// Percentage of the window's quota used (0-100).
    pub used_percent: f64,
    /// Window duration in minutes (300 = 5 hours, 10080 = 1 week).
    pub window_minutes: Option<u32>,
    /// When this window resets.
    pub resets_at: Option<DateTime<Utc>>,
}

impl UsageWindow {
    /// Creates a window with the given percentage.
    pub fn new(used_percent: f64) -> Self {
        Self {
            used_percent,
            window_minutes: None,
            resets_at: None,
        }
    }

    /// Returns the remaining percentage (100 - used, floored at 0).
    pub fn remaining_percent(&self) -> f64 {
        (100.0 - self.used_percent).max(0.0)
    }

    /// Clamps `used_percent` into [0, 100] and zeroes non-finite values.
    ///
    /// Upstream schemas are not contractually stable; a malformed percentage
    /// must not poison the whole result.
    pub fn sanitize(&mut self) {
        if !self.used_percent.is_finite() {
            self.used_percent = 0.0;
        }
        self.used_percent = self.used_percent.clamp(0.0, 100.0);
    }
}

impl Default for UsageWindow {
    fn default() -> Self {
        Self::new(0.0)
    }
}

// ============================================================================
// Spend Usage
// ============================================================================

/// Month-to-date spend for an API-billing provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendUsage {
    /// Spend so far this month, in USD.
    pub spent_usd: f64,
    /// Configured monthly budget in USD, if any.
    pub budget_usd: Option<f64>,
}

impl SpendUsage {
    /// Returns spend divided by budget, when a positive budget is set.
    pub fn budget_fraction(&self) -> Option<f64> {
        match self.budget_usd {
            Some(budget) if budget > 0.0 => Some(self.spent_usd / budget),
            _ => None,
        }
    }
}

// ============================================================================
// Usage Payload
// ============================================================================

/// Provider-defined usage data carried by a successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UsagePayload {
    /// Quota windows reported by a subscription provider.
    Subscription {
        /// Primary window (session-based).
        primary: Option<UsageWindow>,
        /// Secondary window (weekly/monthly).
        secondary: Option<UsageWindow>,
        /// Tertiary window (model-tier specific).
        tertiary: Option<UsageWindow>,
        /// Label for the tertiary window (e.g. "Sonnet").
        tertiary_label: Option<String>,
        /// Account identity, when the provider reports one.
        identity: Option<Identity>,
    },
    /// Spend reported by an API-billing provider.
    Spend(SpendUsage),
}

impl UsagePayload {
    /// Creates an empty subscription payload.
    pub fn subscription() -> Self {
        Self::Subscription {
            primary: None,
            secondary: None,
            tertiary: None,
            tertiary_label: None,
            identity: None,
        }
    }

    /// Returns true if any usage data is present.
    pub fn has_data(&self) -> bool {
        match self {
            Self::Subscription {
                primary,
                secondary,
                tertiary,
                ..
            } => primary.is_some() || secondary.is_some() || tertiary.is_some(),
            Self::Spend(_) => true,
        }
    }

    /// Sanitizes every window in the payload.
    pub fn sanitize(&mut self) {
        if let Self::Subscription {
            primary,
            secondary,
            tertiary,
            ..
        } = self
        {
            for window in [primary, secondary, tertiary].into_iter().flatten() {
                window.sanitize();
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
