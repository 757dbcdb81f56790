//! Provider Registry — which configured provider is active.
//!
//! Selection is a pure function of the immutable startup configuration:
//! primary wins when credentialed unless the caller forces secondary;
//! otherwise secondary wins when credentialed; otherwise nothing is active.

use serde::{Deserialize, Serialize};

use crate::config::RelayConfig;

/// Identity of a configured provider slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// The Gemini-style provider, preferred when credentialed.
    Primary,
    /// The OpenAI-compatible provider.
    Secondary,
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderId::Primary => write!(f, "primary"),
            ProviderId::Secondary => write!(f, "secondary"),
        }
    }
}

/// Caller-side override of the activation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderPreference {
    /// Primary if available, else secondary.
    #[default]
    Auto,
    /// Secondary even if primary is credentialed.
    ForceSecondary,
}

/// One configured provider: identity, credential, and candidate models.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Which slot this provider occupies.
    pub id: ProviderId,
    /// API credential, when configured.
    pub api_key: Option<String>,
    /// Candidate model names in fallback priority order.
    pub models: Vec<String>,
}

impl ProviderConfig {
    /// Whether the provider can actually be called.
    pub fn has_credentials(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Read-only view over the configured providers.
///
/// Built once at startup; safe to share across arbitrarily many concurrent
/// invocations (`&self` everywhere, no interior mutability).
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    primary: ProviderConfig,
    secondary: ProviderConfig,
}

impl ProviderRegistry {
    /// Build the registry from startup configuration.
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            primary: ProviderConfig {
                id: ProviderId::Primary,
                api_key: config.gemini_api_key.clone(),
                models: config.gemini_models.clone(),
            },
            secondary: ProviderConfig {
                id: ProviderId::Secondary,
                api_key: config.openai_api_key.clone(),
                models: config.openai_models.clone(),
            },
        }
    }

    /// The active provider under the given preference, or `None` when no
    /// provider is credentialed.
    pub fn active(&self, prefer: ProviderPreference) -> Option<&ProviderConfig> {
        match prefer {
            ProviderPreference::Auto if self.primary.has_credentials() => Some(&self.primary),
            _ if self.secondary.has_credentials() => Some(&self.secondary),
            // Forced-secondary with no secondary credential does not fall
            // back to primary; the caller asked for a specific provider.
            _ => None,
        }
    }

    /// Whether any provider is usable.
    pub fn is_available(&self) -> bool {
        self.active(ProviderPreference::Auto).is_some()
    }

    /// Name of the active provider, for logs and status endpoints.
    pub fn provider_name(&self) -> Option<String> {
        self.active(ProviderPreference::Auto)
            .map(|p| p.id.to_string())
    }
}
