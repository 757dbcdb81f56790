//! Provider error taxonomy.
//!
//! Adapters classify every failure into this closed set so the orchestration
//! layer decides retry/fallback/abort by matching variants, never by
//! inspecting status codes or message substrings.

use thiserror::Error;

/// Errors produced by a provider adapter.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The service is temporarily overloaded or unavailable. The only
    /// retryable class.
    #[error("provider overloaded: {0}")]
    Overloaded(String),

    /// The requested model name is unknown to this provider or account.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Rate limit or quota exhausted. Account-level; retrying or switching
    /// models will not help.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Missing, malformed, or rejected credentials.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The provider rejected the request shape itself.
    #[error("malformed request: {0}")]
    InvalidRequest(String),

    /// HTTP transport error not otherwise classified.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization error on the wire envelope.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The provider answered successfully but with no usable content.
    #[error("provider returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// Whether the retry policy may attempt this call again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Overloaded(_))
    }

    /// Fold a transport-level failure into the taxonomy: timeouts and
    /// connection refusals are transient unavailability, everything else
    /// stays a transport error.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            ProviderError::Overloaded(err.to_string())
        } else {
            ProviderError::Transport(err)
        }
    }
}

/// Provider result type alias.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Redact provider response bodies that may carry credentials before they
/// reach log output or caller-visible error text.
pub(crate) fn sanitize_body(body: &str) -> String {
    const SECRET_MARKERS: &[&str] = &["api_key", "apikey", "bearer", "secret", "credential", "sk-"];

    let lower = body.to_lowercase();
    if SECRET_MARKERS.iter().any(|m| lower.contains(m)) {
        return "(response body redacted)".to_string();
    }

    const MAX_LEN: usize = 600;
    if body.chars().count() > MAX_LEN {
        let cut = body
            .char_indices()
            .nth(MAX_LEN)
            .map(|(i, _)| i)
            .unwrap_or(body.len());
        format!("{}…", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_overloaded_is_retryable() {
        assert!(ProviderError::Overloaded("503".into()).is_retryable());
        assert!(!ProviderError::QuotaExceeded("429".into()).is_retryable());
        assert!(!ProviderError::ModelNotFound("x".into()).is_retryable());
        assert!(!ProviderError::InvalidCredentials("401".into()).is_retryable());
        assert!(!ProviderError::EmptyResponse.is_retryable());
    }

    #[test]
    fn test_sanitize_body_redacts_secret_markers() {
        assert_eq!(
            sanitize_body("your api_key is wrong"),
            "(response body redacted)"
        );
        assert_eq!(sanitize_body("plain error"), "plain error");
    }

    #[test]
    fn test_sanitize_body_truncates_long_bodies() {
        let long = "x".repeat(2000);
        let out = sanitize_body(&long);
        assert!(out.ends_with('…'));
        assert!(out.chars().count() <= 601);
    }
}
