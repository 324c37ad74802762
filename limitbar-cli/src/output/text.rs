//! Text output formatting with progress bars and colors.

use chrono::{DateTime, Local, Utc};
use limitbar_core::{
    FetchStatus, ProviderResult, SpendUsage, UsagePayload, UsageWindow,
};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    /// Formats one provider's cycle result.
    pub fn format_result(&self, result: &ProviderResult) -> String {
        let name = result.provider.display_name();
        let mut lines = vec![self.bold(name)];

        match result.status {
            FetchStatus::Ok => match &result.usage {
                Some(UsagePayload::Subscription {
                    primary,
                    secondary,
                    tertiary,
                    tertiary_label,
                    identity,
                }) => {
                    if let Some(window) = primary {
                        lines.push(self.format_window(window, "Session"));
                    }
                    if let Some(window) = secondary {
                        lines.push(self.format_window(window, "Weekly"));
                    }
                    if let Some(window) = tertiary {
                        let label = tertiary_label.as_deref().unwrap_or("Tier");
                        lines.push(self.format_window(window, label));
                    }
                    if primary.is_none() && secondary.is_none() && tertiary.is_none() {
                        lines.push(self.dim("No usage data reported."));
                    }
                    if let Some(identity) = identity {
                        if let Some(email) = &identity.email {
                            lines.push(format!("Account: {}", self.cyan(email)));
                        }
                        if let Some(plan) = &identity.plan {
                            lines.push(format!("Plan:    {plan}"));
                        }
                    }
                }
                Some(UsagePayload::Spend(spend)) => {
                    lines.push(self.format_spend(spend));
                }
                None => lines.push(self.dim("No usage data reported.")),
            },
            FetchStatus::Unauthenticated => {
                let message = result
                    .error
                    .as_deref()
                    .unwrap_or("Not authenticated.");
                lines.push(self.yellow(message));
            }
            FetchStatus::Error => {
                let message = result.error.as_deref().unwrap_or("fetch failed");
                lines.push(self.red(&format!("Error: {message}")));
            }
        }

        lines.join("\n")
    }

    /// Formats a usage window with a progress bar.
    fn format_window(&self, window: &UsageWindow, label: &str) -> String {
        let used = window.used_percent;
        let bar = self.progress_bar(used);
        let pct = self.color_for_percent(used, &format!("{used:.0}% used"));

        let mut line = format!("{:<8} {bar} {pct}", format!("{label}:"));
        if let Some(resets_at) = window.resets_at {
            line.push_str(&format!(" {}", self.dim(&format_reset(resets_at))));
        }
        line
    }

    /// Formats spend against an optional budget.
    fn format_spend(&self, spend: &SpendUsage) -> String {
        match (spend.budget_usd, spend.budget_fraction()) {
            (Some(budget), Some(fraction)) => {
                let percent = fraction * 100.0;
                let bar = self.progress_bar(percent);
                let pct = self.color_for_percent(percent, &format!("{percent:.0}% of budget"));
                format!(
                    "{:<8} {bar} {pct} (${:.2} / ${budget:.2})",
                    "Spend:", spend.spent_usd
                )
            }
            _ => format!("{:<8} ${:.2} this month", "Spend:", spend.spent_usd),
        }
    }

    /// Renders a usage bar for a 0-100 percentage.
    fn progress_bar(&self, percent: f64) -> String {
        let clamped = percent.clamp(0.0, 100.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let filled = ((clamped / 100.0) * self.bar_width as f64).round() as usize;
        let filled = filled.min(self.bar_width);

        let mut bar = String::with_capacity(self.bar_width);
        for _ in 0..filled {
            bar.push(BAR_FULL);
        }
        for _ in filled..self.bar_width {
            bar.push(BAR_EMPTY);
        }
        bar
    }

    fn color_for_percent(&self, used_percent: f64, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }
        let color = if used_percent >= 90.0 {
            RED
        } else if used_percent >= 70.0 {
            YELLOW
        } else {
            GREEN
        };
        format!("{color}{text}{RESET}")
    }

    fn bold(&self, text: &str) -> String {
        self.wrap(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.wrap(DIM, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.wrap(CYAN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.wrap(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.wrap(RED, text)
    }

    fn wrap(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// Formats a reset time as a local clock value.
fn format_reset(resets_at: DateTime<Utc>) -> String {
    let local = resets_at.with_timezone(&Local);
    format!("(resets {})", local.format("%b %d %H:%M"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use limitbar_core::ProviderKind;

    fn subscription_result(percent: f64) -> ProviderResult {
        let mut payload = UsagePayload::subscription();
        if let UsagePayload::Subscription { primary, .. } = &mut payload {
            *primary = Some(UsageWindow::new(percent));
        }
        ProviderResult::ok(ProviderKind::Claude, payload)
    }

    #[test]
    fn test_format_subscription_without_colors() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_result(&subscription_result(42.0));

        assert!(output.starts_with("Claude"));
        assert!(output.contains("Session:"));
        assert!(output.contains("42% used"));
        assert!(!output.contains("\x1b["), "no ANSI codes expected");
    }

    #[test]
    fn test_format_spend_with_budget() {
        let formatter = TextFormatter::new(false);
        let result = ProviderResult::ok(
            ProviderKind::OpenaiApi,
            UsagePayload::Spend(SpendUsage {
                spent_usd: 12.5,
                budget_usd: Some(50.0),
            }),
        );
        let output = formatter.format_result(&result);
        assert!(output.contains("25% of budget"));
        assert!(output.contains("$12.50 / $50.00"));
    }

    #[test]
    fn test_format_spend_without_budget() {
        let formatter = TextFormatter::new(false);
        let result = ProviderResult::ok(
            ProviderKind::AnthropicApi,
            UsagePayload::Spend(SpendUsage {
                spent_usd: 3.0,
                budget_usd: None,
            }),
        );
        let output = formatter.format_result(&result);
        assert!(output.contains("$3.00 this month"));
    }

    #[test]
    fn test_format_unauthenticated_prompts_login() {
        let formatter = TextFormatter::new(false);
        let result = ProviderResult::unauthenticated(ProviderKind::Codex);
        let output = formatter.format_result(&result);
        assert!(output.contains("--login codex"));
    }

    #[test]
    fn test_format_error() {
        let formatter = TextFormatter::new(false);
        let result = ProviderResult::error(ProviderKind::Cursor, "timeout after 30s");
        let output = formatter.format_result(&result);
        assert!(output.contains("Error: timeout after 30s"));
    }

    #[test]
    fn test_progress_bar_widths() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(0.0), "░░░░░░░░░░");
        assert_eq!(formatter.progress_bar(50.0), "█████░░░░░");
        assert_eq!(formatter.progress_bar(100.0), "██████████");
        // Out-of-range values clamp instead of overflowing the bar.
        assert_eq!(formatter.progress_bar(250.0), "██████████");
    }

    #[test]
    fn test_colors_emitted_when_enabled() {
        let formatter = TextFormatter::new(true);
        let output = formatter.format_result(&subscription_result(95.0));
        assert!(output.contains(RED));
    }
}
