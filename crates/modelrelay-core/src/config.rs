//! Configuration for the ModelRelay orchestration layer.
//!
//! Loaded once at process startup and never mutated afterwards; every
//! orchestration call reads it concurrently without locking.

use serde::{Deserialize, Serialize};

/// Environment variable holding the Gemini-style (primary) credential.
pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";
/// Environment variable holding the OpenAI-compatible (secondary) credential.
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
/// Optional path to a TOML config file merged under the environment.
pub const CONFIG_PATH_VAR: &str = "MODELRELAY_CONFIG";

/// Top-level ModelRelay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Credential for the primary (Gemini-style) provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,

    /// Credential for the secondary (OpenAI-compatible) provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,

    /// Candidate models for the primary provider, tried in order.
    #[serde(default = "default_gemini_models")]
    pub gemini_models: Vec<String>,

    /// Candidate models for the secondary provider, tried in order.
    #[serde(default = "default_openai_models")]
    pub openai_models: Vec<String>,

    /// Retries per model for overload-class failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            openai_api_key: None,
            gemini_models: default_gemini_models(),
            openai_models: default_openai_models(),
            max_retries: default_max_retries(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Load from the environment.
    ///
    /// Reads `GEMINI_API_KEY` and `OPENAI_API_KEY`; if `MODELRELAY_CONFIG`
    /// points at a TOML file it is read first, with environment values
    /// taking precedence.
    pub fn from_env() -> Self {
        let mut config = std::env::var(CONFIG_PATH_VAR)
            .ok()
            .and_then(|path| Self::from_file(&path).ok())
            .unwrap_or_default();

        if let Ok(key) = std::env::var(GEMINI_KEY_VAR) {
            if !key.trim().is_empty() {
                config.gemini_api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var(OPENAI_KEY_VAR) {
            if !key.trim().is_empty() {
                config.openai_api_key = Some(key);
            }
        }
        config
    }

    /// Load from a TOML file.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Whether at least one provider has a credential.
    pub fn has_any_credential(&self) -> bool {
        self.gemini_api_key.is_some() || self.openai_api_key.is_some()
    }
}

fn default_gemini_models() -> Vec<String> {
    vec![
        "gemini-2.0-flash".into(),
        "gemini-1.5-flash".into(),
        "gemini-1.5-pro".into(),
    ]
}

fn default_openai_models() -> Vec<String> {
    vec!["gpt-4o-mini".into(), "gpt-3.5-turbo".into()]
}

fn default_max_retries() -> u32 {
    2
}

/// Telemetry/observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Whether to export traces over OTLP.
    #[serde(default)]
    pub otlp_enabled: bool,

    /// OTLP exporter endpoint.
    #[serde(default = "default_otlp_endpoint")]
    pub otlp_endpoint: String,

    /// Emit JSON-formatted log lines instead of human-readable ones.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_enabled: false,
            otlp_endpoint: default_otlp_endpoint(),
            json_logs: false,
        }
    }
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4317".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_ordered_model_lists() {
        let config = RelayConfig::default();
        assert_eq!(config.gemini_models[0], "gemini-2.0-flash");
        assert_eq!(config.openai_models[0], "gpt-4o-mini");
        assert_eq!(config.max_retries, 2);
        assert!(!config.has_any_credential());
    }

    #[test]
    fn test_toml_roundtrip() {
        let raw = r#"
            gemini_api_key = "g-key"
            gemini_models = ["gemini-1.5-flash"]
            max_retries = 3

            [telemetry]
            json_logs = true
        "#;
        let config: RelayConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("g-key"));
        assert_eq!(config.gemini_models, vec!["gemini-1.5-flash"]);
        assert_eq!(config.max_retries, 3);
        assert!(config.telemetry.json_logs);
        // Unset sections keep their defaults.
        assert_eq!(config.openai_models, vec!["gpt-4o-mini", "gpt-3.5-turbo"]);
    }
}
