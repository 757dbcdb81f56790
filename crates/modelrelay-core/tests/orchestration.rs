//! End-to-end orchestration tests against scripted fake providers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use modelrelay_core::usecases::{self, ContentSource};
use modelrelay_core::{
    ChatMessage, InvocationRequest, Orchestrator, ProviderClient, ProviderError, RelayConfig,
    RelayError,
};
use modelrelay_providers::GenerateRequest;

/// Fake provider that replays a script of results and records every call.
struct ScriptedClient {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: Mutex<Vec<(String, GenerateRequest)>>,
}

impl ScriptedClient {
    fn new(script: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, GenerateRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderClient for ScriptedClient {
    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), request.clone()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::EmptyResponse))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn test_config() -> RelayConfig {
    RelayConfig {
        gemini_api_key: Some("test-key".into()),
        gemini_models: vec!["m1".into(), "m2".into()],
        max_retries: 2,
        ..RelayConfig::default()
    }
}

fn relay_with(script: Vec<Result<String, ProviderError>>) -> (Orchestrator, Arc<ScriptedClient>) {
    let client = ScriptedClient::new(script);
    let relay = Orchestrator::with_clients(
        &test_config(),
        Some(client.clone() as Arc<dyn ProviderClient>),
        None,
    );
    (relay, client)
}

#[tokio::test(start_paused = true)]
async fn overloaded_m1_exhausts_retries_then_m2_answers_json() {
    let overloaded = || Err(ProviderError::Overloaded("status 503".into()));
    let (relay, client) = relay_with(vec![
        overloaded(),
        overloaded(),
        overloaded(),
        Ok("{\"title\":\"X\"}".to_string()),
    ]);

    let map = relay
        .generate_json(InvocationRequest::new("give me a title"))
        .await
        .unwrap();
    assert_eq!(map["title"], "X");

    let calls = client.calls();
    let models: Vec<&str> = calls.iter().map(|(m, _)| m.as_str()).collect();
    // m1: initial attempt plus the full retry budget; m2: exactly once.
    assert_eq!(models, vec!["m1", "m1", "m1", "m2"]);
}

#[tokio::test(start_paused = true)]
async fn quota_error_surfaces_without_touching_second_model() {
    let (relay, client) = relay_with(vec![Err(ProviderError::QuotaExceeded("limit hit".into()))]);

    let err = relay
        .generate(InvocationRequest::new("anything"))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::QuotaExceeded { .. }));
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn no_provider_configured_fails_before_any_call() {
    let relay = Orchestrator::with_clients(&RelayConfig::default(), None, None);
    let err = relay
        .generate(InvocationRequest::new("anything"))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::NoProviderConfigured));
    assert!(!relay.is_available());
}

#[tokio::test]
async fn blog_post_parses_fenced_reply_with_trailing_comma() {
    let reply = "```json\n{\"title\": \"Ship It\", \"excerpt\": \"Go live faster.\", \
                 \"content\": \"Body text.\", \"tags\": [\"devops\",]}\n```";
    let (relay, _client) = relay_with(vec![Ok(reply.to_string())]);

    let post = usecases::blog::generate_blog_post(&relay, "shipping", "devops")
        .await
        .unwrap();
    assert_eq!(post.source, ContentSource::Generated);
    assert_eq!(post.title, "Ship It");
    assert_eq!(post.slug, "ship-it");
    assert_eq!(post.tags, vec!["devops"]);
}

#[tokio::test]
async fn blog_post_falls_back_after_two_prose_replies() {
    let prose = || Ok("I'd be happy to write that article for you!".to_string());
    let (relay, client) = relay_with(vec![prose(), prose()]);

    let post = usecases::blog::generate_blog_post(&relay, "caching strategies", "backend")
        .await
        .unwrap();
    assert_eq!(post.source, ContentSource::Fallback);
    assert!(post.title.contains("caching strategies"));
    assert!(post.content.contains("backend"));

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    // The second attempt carries the strict JSON-only instruction.
    let second_system = calls[1].1.system_instruction.as_deref().unwrap();
    assert!(second_system.contains("ONLY a valid JSON object"));
}

#[tokio::test]
async fn blog_post_missing_required_field_also_falls_back() {
    // Parses fine, but "content" is empty — discarded wholesale.
    let partial = || Ok("{\"title\": \"T\", \"excerpt\": \"E\", \"content\": \"\"}".to_string());
    let (relay, _client) = relay_with(vec![partial(), partial()]);

    let post = usecases::blog::generate_blog_post(&relay, "topic", "category")
        .await
        .unwrap();
    assert_eq!(post.source, ContentSource::Fallback);
}

#[tokio::test]
async fn seo_generation_round_trips() {
    let reply = "{\"meta_title\": \"CRM Kit\", \"meta_description\": \"A ready CRM.\", \
                 \"keywords\": [\"crm\", \"sales\"]}";
    let (relay, _client) = relay_with(vec![Ok(reply.to_string())]);

    let fields = usecases::seo::generate_seo(&relay, "CRM Kit", "A customer manager")
        .await
        .unwrap();
    assert_eq!(fields.source, ContentSource::Generated);
    assert_eq!(fields.keywords, vec!["crm", "sales"]);
}

#[tokio::test]
async fn chat_reply_sends_normalized_history() {
    let (relay, client) = relay_with(vec![Ok("Here to help.".to_string())]);

    let history = vec![
        ChatMessage::assistant("Welcome!"),
        ChatMessage::user("hi"),
        ChatMessage::assistant("draft"),
        ChatMessage::assistant("Hello, how can I help?"),
    ];
    let reply = usecases::chat::chat_reply(&relay, "Do you sell CRM code?", history)
        .await
        .unwrap();
    assert_eq!(reply, "Here to help.");

    let calls = client.calls();
    let sent = &calls[0].1.messages;
    // Leading assistant turn dropped, duplicate assistant turns collapsed,
    // prompt appended as the final user turn.
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0], ChatMessage::user("hi"));
    assert_eq!(sent[1], ChatMessage::assistant("Hello, how can I help?"));
    assert_eq!(sent[2], ChatMessage::user("Do you sell CRM code?"));
}

#[tokio::test]
async fn analysis_falls_back_on_quota_free_parse_failure_only() {
    // First call quota-errors: the use case must propagate, not fall back.
    let (relay, _client) = relay_with(vec![Err(ProviderError::QuotaExceeded("429".into()))]);
    let err = usecases::analysis::analyze_requirements(&relay, "a booking app")
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::QuotaExceeded { .. }));
}

#[tokio::test(start_paused = true)]
async fn deadline_cuts_off_mid_backoff() {
    let overloaded = || Err(ProviderError::Overloaded("503".into()));
    // Endless overload script; the deadline has to break the loop.
    let (relay, _client) = relay_with(vec![
        overloaded(),
        overloaded(),
        overloaded(),
        overloaded(),
        overloaded(),
        overloaded(),
    ]);

    let err = relay
        .generate(
            InvocationRequest::new("anything").deadline(std::time::Duration::from_millis(1500)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::AllModelsExhausted { .. }));
}
