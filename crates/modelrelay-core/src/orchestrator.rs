//! Orchestrator — the in-process boundary route handlers call.
//!
//! Owns the provider registry and the concrete clients, assembles the wire
//! request (normalized history + prompt + system instruction), and drives
//! the fallback executor. Construction is explicit: configuration and
//! clients are injected at startup, so tests run against fake providers.

use std::sync::Arc;
use std::time::Duration;

use modelrelay_providers::{
    ChatMessage, GeminiClient, GenerateRequest, OpenAiClient, ProviderClient,
};
use serde_json::{Map, Value};
use tracing::Instrument;

use crate::config::RelayConfig;
use crate::error::{FailureClass, RelayError, RelayResult};
use crate::executor;
use crate::extract;
use crate::history;
use crate::registry::{ProviderId, ProviderPreference, ProviderRegistry};

/// One orchestration request, built by callers per invocation.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// The active prompt; always sent as the final user turn.
    pub prompt: String,

    /// Optional system instruction.
    pub system_instruction: Option<String>,

    /// Prior conversation turns; normalized before sending.
    pub history: Vec<ChatMessage>,

    /// Candidate models overriding the provider's configured list.
    pub models: Option<Vec<String>>,

    /// Whether the caller expects a JSON object back.
    pub expect_json: bool,

    /// Provider activation override.
    pub prefer: ProviderPreference,

    /// Overall deadline for the whole fallback chain, including backoff
    /// sleeps. `None` means no deadline.
    pub timeout: Option<Duration>,
}

impl InvocationRequest {
    /// Start a request with just a prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: None,
            history: Vec::new(),
            models: None,
            expect_json: false,
            prefer: ProviderPreference::default(),
            timeout: None,
        }
    }

    /// Set the system instruction.
    pub fn system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Attach conversation history.
    pub fn history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    /// Override the candidate model list.
    pub fn models(mut self, models: Vec<String>) -> Self {
        self.models = Some(models);
        self
    }

    /// Expect a JSON object reply.
    pub fn json(mut self) -> Self {
        self.expect_json = true;
        self
    }

    /// Set the provider preference.
    pub fn prefer(mut self, prefer: ProviderPreference) -> Self {
        self.prefer = prefer;
        self
    }

    /// Set an overall deadline.
    pub fn deadline(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Provider orchestration facade.
pub struct Orchestrator {
    registry: ProviderRegistry,
    primary_client: Option<Arc<dyn ProviderClient>>,
    secondary_client: Option<Arc<dyn ProviderClient>>,
    max_retries: u32,
}

impl Orchestrator {
    /// Build an orchestrator with real HTTP clients for every credentialed
    /// provider in the configuration.
    pub fn new(config: &RelayConfig) -> RelayResult<Self> {
        let primary_client: Option<Arc<dyn ProviderClient>> = match &config.gemini_api_key {
            Some(key) if !key.trim().is_empty() => Some(Arc::new(GeminiClient::new(key.clone())?)),
            _ => None,
        };
        let secondary_client: Option<Arc<dyn ProviderClient>> = match &config.openai_api_key {
            Some(key) if !key.trim().is_empty() => Some(Arc::new(OpenAiClient::new(key.clone())?)),
            _ => None,
        };
        Ok(Self {
            registry: ProviderRegistry::new(config),
            primary_client,
            secondary_client,
            max_retries: config.max_retries,
        })
    }

    /// Build from environment variables. See [`RelayConfig::from_env`].
    pub fn from_env() -> RelayResult<Self> {
        Self::new(&RelayConfig::from_env())
    }

    /// Build with injected clients; used by tests and embedders with their
    /// own transport.
    pub fn with_clients(
        config: &RelayConfig,
        primary_client: Option<Arc<dyn ProviderClient>>,
        secondary_client: Option<Arc<dyn ProviderClient>>,
    ) -> Self {
        Self {
            registry: ProviderRegistry::new(config),
            primary_client,
            secondary_client,
            max_retries: config.max_retries,
        }
    }

    /// Whether any provider is usable.
    pub fn is_available(&self) -> bool {
        self.registry.is_available()
    }

    /// Name of the active provider, for status reporting.
    pub fn provider_name(&self) -> Option<String> {
        self.registry.provider_name()
    }

    /// Run one orchestration invocation and return the raw text reply.
    pub async fn generate(&self, request: InvocationRequest) -> RelayResult<String> {
        let provider = self
            .registry
            .active(request.prefer)
            .ok_or(RelayError::NoProviderConfigured)?;
        let client = match provider.id {
            ProviderId::Primary => self.primary_client.as_ref(),
            ProviderId::Secondary => self.secondary_client.as_ref(),
        }
        .ok_or(RelayError::NoProviderConfigured)?;

        let models = request
            .models
            .clone()
            .unwrap_or_else(|| provider.models.clone());
        let wire = build_wire_request(&request);

        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "orchestrate",
            %request_id,
            provider = %provider.id,
            candidates = models.len(),
        );

        let run = executor::execute(&models, self.max_retries, |model| {
            let client = Arc::clone(client);
            let wire = &wire;
            async move { client.generate(&model, wire).await }
        })
        .instrument(span);

        match request.timeout {
            Some(deadline) => match tokio::time::timeout(deadline, run).await {
                Ok(result) => result,
                Err(_) => Err(RelayError::AllModelsExhausted {
                    class: FailureClass::Overloaded,
                    detail: format!("deadline of {deadline:?} exceeded"),
                }),
            },
            None => run.await,
        }
    }

    /// Run one invocation and recover a JSON object from the reply.
    ///
    /// Field validation stays with the caller (see
    /// [`crate::extract::validate_required_fields`]); this only guarantees
    /// a well-formed object or [`RelayError::Unparsable`].
    pub async fn generate_json(
        &self,
        request: InvocationRequest,
    ) -> RelayResult<Map<String, Value>> {
        let text = self.generate(request.json()).await?;
        extract::parse_json(&text)
    }

    /// Retry budget per model, exposed for callers composing their own loops.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

/// Assemble the provider-agnostic wire request: normalized history plus the
/// prompt as the final user turn. An empty normalized history degrades to a
/// single-shot call.
fn build_wire_request(request: &InvocationRequest) -> GenerateRequest {
    let mut messages = history::normalize(&request.history);
    if messages.is_empty() {
        messages = vec![ChatMessage::user(request.prompt.clone())];
    } else {
        match messages.last_mut() {
            // Keep strict alternation if the history already ends on a user
            // turn.
            Some(last) if last.role == modelrelay_providers::Role::User => {
                last.content.push(' ');
                last.content.push_str(&request.prompt);
            }
            _ => messages.push(ChatMessage::user(request.prompt.clone())),
        }
    }

    GenerateRequest {
        system_instruction: request.system_instruction.clone(),
        messages,
        expect_json: request.expect_json,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelrelay_providers::Role;

    #[test]
    fn test_wire_request_single_shot_without_history() {
        let wire = build_wire_request(&InvocationRequest::new("hello").system("sys"));
        assert_eq!(wire.messages, vec![ChatMessage::user("hello")]);
        assert_eq!(wire.system_instruction.as_deref(), Some("sys"));
    }

    #[test]
    fn test_wire_request_appends_prompt_after_assistant_turn() {
        let request = InvocationRequest::new("and now?").history(vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ]);
        let wire = build_wire_request(&request);
        assert_eq!(wire.messages.len(), 3);
        assert_eq!(wire.messages[2], ChatMessage::user("and now?"));
    }

    #[test]
    fn test_wire_request_merges_prompt_into_trailing_user_turn() {
        let request = InvocationRequest::new("part two")
            .history(vec![ChatMessage::user("part one")]);
        let wire = build_wire_request(&request);
        assert_eq!(wire.messages.len(), 1);
        assert_eq!(wire.messages[0].role, Role::User);
        assert_eq!(wire.messages[0].content, "part one part two");
    }

    #[test]
    fn test_wire_request_entirely_invalid_history_degrades_to_single_shot() {
        let request = InvocationRequest::new("solo").history(vec![
            ChatMessage::assistant("orphan greeting"),
            ChatMessage::user("   "),
        ]);
        let wire = build_wire_request(&request);
        assert_eq!(wire.messages, vec![ChatMessage::user("solo")]);
    }
}
