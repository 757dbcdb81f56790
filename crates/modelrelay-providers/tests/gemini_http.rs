//! HTTP-level tests for the Gemini-style adapter against a mock server.

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use modelrelay_providers::{GeminiClient, GenerateRequest, ProviderClient, ProviderError};

fn ok_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    })
}

#[tokio::test]
async fn generate_returns_joined_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"/models/gemini-1\.5-flash:generateContent$"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [
                { "content": { "role": "model", "parts": [
                    { "text": "Hello " }, { "text": "world" }
                ] } }
            ]
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("test-key", &server.uri()).unwrap();
    let text = client
        .generate("gemini-1.5-flash", &GenerateRequest::prompt("hi"))
        .await
        .unwrap();
    assert_eq!(text, "Hello world");
}

#[tokio::test]
async fn overloaded_status_classifies_as_overloaded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "error": { "message": "The model is overloaded.", "status": "UNAVAILABLE" }
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("test-key", &server.uri()).unwrap();
    let err = client
        .generate("gemini-1.5-flash", &GenerateRequest::prompt("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Overloaded(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn unknown_model_classifies_as_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "message": "models/nope is not found", "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("test-key", &server.uri()).unwrap();
    let err = client
        .generate("nope", &GenerateRequest::prompt("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::ModelNotFound(_)));
}

#[tokio::test]
async fn empty_candidates_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": []
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("test-key", &server.uri()).unwrap();
    let err = client
        .generate("gemini-1.5-flash", &GenerateRequest::prompt("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::EmptyResponse));
}

#[tokio::test]
async fn whitespace_only_reply_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("   \n")))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("test-key", &server.uri()).unwrap();
    let err = client
        .generate("gemini-1.5-flash", &GenerateRequest::prompt("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::EmptyResponse));
}
