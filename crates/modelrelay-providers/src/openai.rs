//! OpenAI-compatible provider adapter.
//!
//! Speaks the chat-completions shape with bearer auth. When the caller
//! expects JSON the adapter enables the native `json_object` response
//! format, so replies from this provider are usually already clean JSON.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::chat::{GenerateRequest, Role};
use crate::error::{sanitize_body, ProviderError, ProviderResult};
use crate::ProviderClient;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Client for an OpenAI-compatible chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    /// API base URL, without the `/chat/completions` suffix.
    base_url: Url,

    /// HTTP client.
    http: reqwest::Client,

    /// Bearer token.
    api_key: String,
}

impl OpenAiClient {
    /// Create a client against the public endpoint.
    pub fn new(api_key: impl Into<String>) -> ProviderResult<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a compatible endpoint (tests, self-hosted).
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> ProviderResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ProviderError::InvalidRequest(format!("invalid base URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ProviderError::Transport)?;
        Ok(Self {
            base_url,
            http,
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}/chat/completions", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url
    }

    /// Map an HTTP failure status plus error body onto the taxonomy.
    ///
    /// 429 covers both rate limits and exhausted quota here; both are
    /// account-level, so both classify as quota and are never retried.
    fn classify_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
        let envelope: Option<ErrorEnvelope> = serde_json::from_str(body).ok();
        let code = envelope
            .as_ref()
            .and_then(|e| e.error.code.as_deref())
            .unwrap_or("");
        let message = envelope
            .as_ref()
            .map(|e| e.error.message.clone())
            .unwrap_or_else(|| sanitize_body(body));

        match status.as_u16() {
            401 => ProviderError::InvalidCredentials(message),
            404 => ProviderError::ModelNotFound(message),
            _ if code == "model_not_found" => ProviderError::ModelNotFound(message),
            429 => ProviderError::QuotaExceeded(message),
            400 => ProviderError::InvalidRequest(message),
            _ if status.is_server_error() => ProviderError::Overloaded(message),
            _ => ProviderError::InvalidRequest(format!("unexpected status {status}: {message}")),
        }
    }
}

#[async_trait]
impl ProviderClient for OpenAiClient {
    async fn generate(&self, model: &str, request: &GenerateRequest) -> ProviderResult<String> {
        let mut messages: Vec<WireMessage> = Vec::with_capacity(request.messages.len() + 1);
        if let Some(ref system) = request.system_instruction {
            messages.push(WireMessage {
                role: "system".into(),
                content: system.clone(),
            });
        }
        messages.extend(request.messages.iter().map(|m| WireMessage {
            role: match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            }
            .into(),
            content: m.content.clone(),
        }));

        let body = ChatCompletionRequest {
            model: model.to_string(),
            messages,
            response_format: request.expect_json.then(|| ResponseFormat {
                format_type: "json_object".into(),
            }),
        };

        tracing::debug!(model, turns = request.messages.len(), "Sending chat completion request");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(ProviderError::from_transport)?;

        if !status.is_success() {
            return Err(Self::classify_status(status, &text));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)?;
        let content = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(content)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// ── Wire Types ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    /// Can be null when the reply was refused or filtered.
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status_401_is_credentials() {
        let err = OpenAiClient::classify_status(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#,
        );
        assert!(matches!(err, ProviderError::InvalidCredentials(_)));
    }

    #[test]
    fn test_classify_status_429_is_quota_even_for_rate_limits() {
        let err = OpenAiClient::classify_status(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"Rate limit reached","code":"rate_limit_exceeded"}}"#,
        );
        assert!(matches!(err, ProviderError::QuotaExceeded(_)));
    }

    #[test]
    fn test_classify_status_5xx_is_overloaded() {
        let err = OpenAiClient::classify_status(
            reqwest::StatusCode::BAD_GATEWAY,
            "upstream connect error",
        );
        assert!(matches!(err, ProviderError::Overloaded(_)));
    }

    #[test]
    fn test_json_mode_sets_response_format() {
        let req = ChatCompletionRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![],
            response_format: Some(ResponseFormat {
                format_type: "json_object".into(),
            }),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r#""type":"json_object""#));
    }
}
