//! Orchestration-level error types.

use thiserror::Error;

use crate::config::{GEMINI_KEY_VAR, OPENAI_KEY_VAR};

/// Why every candidate model ultimately failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Every candidate was temporarily overloaded; worth retrying shortly.
    Overloaded,
    /// The configured credential was rejected.
    InvalidCredentials,
    /// The account's quota or rate limit was hit.
    QuotaExceeded,
    /// Something else; details in the accompanying text.
    Unknown,
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureClass::Overloaded => {
                write!(f, "AI service temporarily overloaded, retry shortly")
            }
            FailureClass::InvalidCredentials => write!(f, "AI service credentials are invalid"),
            FailureClass::QuotaExceeded => write!(f, "AI service quota exceeded"),
            FailureClass::Unknown => write!(f, "AI service unavailable"),
        }
    }
}

/// Errors surfaced to route handlers and other callers of the library.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No provider has credentials. Checked before any network call.
    #[error("no AI provider is configured — set {GEMINI_KEY_VAR} or {OPENAI_KEY_VAR}")]
    NoProviderConfigured,

    /// Every candidate model failed; `class` summarizes the last failure.
    #[error("all candidate models failed: {class} ({detail})")]
    AllModelsExhausted {
        class: FailureClass,
        detail: String,
    },

    /// Account-level quota or rate limit; not masked by model fallback.
    #[error("quota exceeded on {provider}: {detail}")]
    QuotaExceeded { provider: String, detail: String },

    /// Credential rejected; not masked by model fallback.
    #[error("invalid credentials for {provider}: {detail}")]
    InvalidCredentials { provider: String, detail: String },

    /// Every extraction strategy failed to recover a JSON object.
    #[error("response could not be parsed as JSON")]
    Unparsable {
        /// Best-effort raw text, kept so callers can log or fall back.
        raw: String,
    },

    /// An adapter failure that is not part of the fallback protocol
    /// (malformed request, wire-envelope decode error, ...).
    #[error("provider error: {0}")]
    Provider(#[from] modelrelay_providers::ProviderError),
}

/// Relay result type alias.
pub type RelayResult<T> = Result<T, RelayError>;
