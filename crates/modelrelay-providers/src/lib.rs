//! # modelrelay-providers
//!
//! Typed client adapters for the language-model APIs that the ModelRelay
//! orchestration layer talks to.
//!
//! Two wire flavors are covered:
//! - [`GeminiClient`] — a Gemini-style native REST API (`generateContent`,
//!   `user`/`model` roles, prose-or-Markdown output)
//! - [`OpenAiClient`] — an OpenAI-compatible chat-completions API with
//!   optional native JSON mode
//!
//! Both adapters normalize their provider-specific response shapes into
//! plain text and classify failures into the closed [`ProviderError`]
//! taxonomy, so the orchestration layer never has to match on status codes
//! or error-message substrings.

pub mod chat;
pub mod error;
pub mod gemini;
pub mod openai;

// Re-exports
pub use chat::{ChatMessage, GenerateRequest, Role};
pub use error::{ProviderError, ProviderResult};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use async_trait::async_trait;

/// A language-model provider that can turn a request into raw text.
///
/// Implementations map their own wire format and error envelope onto
/// [`GenerateRequest`] / [`ProviderError`]; callers stay provider-agnostic.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Invoke `model` with the given request and return the raw text reply.
    async fn generate(&self, model: &str, request: &GenerateRequest) -> ProviderResult<String>;

    /// Short identifier for logs ("gemini", "openai").
    fn name(&self) -> &str;
}
