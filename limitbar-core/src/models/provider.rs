//! Provider identity and metadata types.
//!
//! - [`ProviderKind`] - Enum of supported providers
//! - [`ProviderCategory`] - Subscription vs API-billing
//! - [`ProviderMetadata`] - Static capabilities and display info

use serde::{Deserialize, Serialize};

// ============================================================================
// Provider Kind
// ============================================================================

/// Supported provider kinds.
///
/// The serialized form (`claude`, `openai-api`, ...) is the stable id used
/// as the CLI name, the settings key, and the credential-store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Anthropic Claude subscription (OAuth).
    Claude,
    /// OpenAI Codex / ChatGPT subscription (OAuth).
    Codex,
    /// GitHub Copilot (device-flow OAuth).
    Copilot,
    /// Cursor IDE (session cookie).
    Cursor,
    /// OpenAI organization billing (admin API key).
    OpenaiApi,
    /// Anthropic organization billing (admin API key).
    AnthropicApi,
}

impl ProviderKind {
    /// Returns the display name for this provider.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Claude => "Claude",
            Self::Codex => "Codex",
            Self::Copilot => "Copilot",
            Self::Cursor => "Cursor",
            Self::OpenaiApi => "OpenAI API",
            Self::AnthropicApi => "Anthropic API",
        }
    }

    /// Returns the stable string id (also the CLI name).
    pub fn id(&self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Codex => "codex",
            Self::Copilot => "copilot",
            Self::Cursor => "cursor",
            Self::OpenaiApi => "openai-api",
            Self::AnthropicApi => "anthropic-api",
        }
    }

    /// Parses a stable string id back into a kind.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.id() == id)
    }

    /// Returns all provider kinds in default display order.
    pub fn all() -> &'static [ProviderKind] {
        &[
            Self::Claude,
            Self::Codex,
            Self::Copilot,
            Self::Cursor,
            Self::OpenaiApi,
            Self::AnthropicApi,
        ]
    }

    /// Returns the category this provider belongs to.
    pub fn category(&self) -> ProviderCategory {
        match self {
            Self::Claude | Self::Codex | Self::Copilot | Self::Cursor => {
                ProviderCategory::Subscription
            }
            Self::OpenaiApi | Self::AnthropicApi => ProviderCategory::Api,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

// ============================================================================
// Provider Category
// ============================================================================

/// How a provider authenticates and reports usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderCategory {
    /// Credential-gated quota reporting (OAuth tokens or cookies).
    Subscription,
    /// API-key-gated billing reporting (spend against a budget).
    Api,
}

// ============================================================================
// Provider Metadata
// ============================================================================

/// Static metadata describing a provider.
///
/// Defined once at process start and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// The provider this metadata describes.
    pub kind: ProviderKind,
    /// Display name in output.
    pub display_name: String,
    /// Category (subscription vs API billing).
    pub category: ProviderCategory,
    /// Whether a monthly budget setting applies to this provider.
    pub supports_budget: bool,
}

impl ProviderMetadata {
    /// Creates metadata with the kind's defaults.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            display_name: kind.display_name().to_string(),
            category: kind.category(),
            supports_budget: kind.category() == ProviderCategory::Api,
        }
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Account identity attached to a fetch result.
///
/// Siloed per provider - never mix identity across providers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Account email address.
    pub email: Option<String>,
    /// Plan or login-method label (e.g. "Claude Max", "ChatGPT Plus").
    pub plan: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
