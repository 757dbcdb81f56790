//! Gemini-style provider adapter.
//!
//! Speaks the native `generateContent` REST shape: conversation turns use
//! `user`/`model` roles, the system instruction travels out-of-band, and the
//! reply arrives as candidate parts that are joined into one text block.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::chat::{GenerateRequest, Role};
use crate::error::{sanitize_body, ProviderError, ProviderResult};
use crate::ProviderClient;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Client for a Gemini-style `generateContent` API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    /// API base URL, without the `/models/...` suffix.
    base_url: Url,

    /// HTTP client.
    http: reqwest::Client,

    /// API key, passed as a query parameter per the wire format.
    api_key: String,
}

impl GeminiClient {
    /// Create a client against the public endpoint.
    pub fn new(api_key: impl Into<String>) -> ProviderResult<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (tests, regional proxies).
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

    fn endpoint(&self, model: &str) -> ProviderResult<Url> {
        let path = format!(
            "{}/models/{model}:generateContent",
            self.base_url.path().trim_end_matches('/')
        );
        let mut url = self.base_url.clone();
        url.set_path(&path);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Map an HTTP failure status plus error body onto the taxonomy.
    fn classify_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
        let envelope: Option<ErrorEnvelope> = serde_json::from_str(body).ok();
        let api_status = envelope
            .as_ref()
            .and_then(|e| e.error.status.as_deref())
            .unwrap_or("");
        let message = envelope
            .as_ref()
            .map(|e| e.error.message.clone())
            .unwrap_or_else(|| sanitize_body(body));

        match status.as_u16() {
            404 => ProviderError::ModelNotFound(message),
            429 => ProviderError::QuotaExceeded(message),
            401 | 403 => ProviderError::InvalidCredentials(message),
            400 if message.contains("API_KEY_INVALID") || api_status == "UNAUTHENTICATED" => {
                ProviderError::InvalidCredentials(message)
            }
            400 => ProviderError::InvalidRequest(message),
            503 => ProviderError::Overloaded(message),
            _ if api_status == "UNAVAILABLE" => ProviderError::Overloaded(message),
            _ if status.is_server_error() => ProviderError::Overloaded(message),
            _ => ProviderError::InvalidRequest(format!("unexpected status {status}: {message}")),
        }
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    async fn generate(&self, model: &str, request: &GenerateRequest) -> ProviderResult<String> {
        let body = GenerateContentRequest::from(request);
        let url = self.endpoint(model)?;

        tracing::debug!(model, turns = request.messages.len(), "Sending generateContent request");

        let response = self
            .http
            .post(url)
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

        let parsed: GenerateContentResponse = serde_json::from_str(&text)?;
        let content = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(content)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ── Wire Types ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl From<&GenerateRequest> for GenerateContentRequest {
    fn from(req: &GenerateRequest) -> Self {
        let contents = req
            .messages
            .iter()
            .map(|m| Content {
                // The wire format calls the assistant role "model".
                role: Some(
                    match m.role {
                        Role::User => "user",
                        Role::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: Some(m.content.clone()),
                }],
            })
            .collect();

        let system_instruction = req.system_instruction.as_ref().map(|s| Content {
            role: None,
            parts: vec![Part {
                text: Some(s.clone()),
            }],
        });

        Self {
            contents,
            system_instruction,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}
