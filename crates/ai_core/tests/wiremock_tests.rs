//! Integration tests for the assistant and completion clients using WireMock
//!
//! These tests mock the voice endpoint and the chat-completion API to verify
//! request shape, timeout handling and error classification.

use std::time::Duration;

use ai_core::{
    AssistantClient, AssistantConfig, AssistantError, ChatCompletionEngine, CompletionConfig,
    CompletionError,
};
use domain::{Locale, Query};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

// =============================================================================
// Test Helpers
// =============================================================================

fn assistant_for_mock(base_url: &str, timeout_ms: u64) -> AssistantClient {
    AssistantClient::new(&AssistantConfig {
        base_url: base_url.to_string(),
        path: "/api/voice".to_string(),
        timeout_ms,
    })
    .unwrap()
}

fn completion_for_mock(base_url: &str, timeout_ms: u64) -> ChatCompletionEngine {
    ChatCompletionEngine::new(
        CompletionConfig {
            base_url: base_url.to_string(),
            model: "test-model".to_string(),
            timeout_ms,
            ..Default::default()
        }
        .with_api_key("test-key"),
    )
    .unwrap()
}

/// Successful voice endpoint answer
fn voice_success(response: &str, language: &str) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "response": response,
        "language": language,
        "modelUsed": "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo"
    })
}

/// Chat-completion answer with a single choice
fn completion_success(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "cmpl-1",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

// =============================================================================
// AssistantClient
// =============================================================================

#[tokio::test]
async fn ask_posts_query_and_language() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/voice"))
        .and(body_partial_json(serde_json::json!({
            "query": "मुझे राशन कार्ड बनवाना है",
            "language": "hi"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(voice_success("  राशन कार्ड के लिए...  ", "hi")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = assistant_for_mock(&server.uri(), 5_000);
    let reply = client
        .ask_detailed(" मुझे राशन कार्ड बनवाना है ", "hi")
        .await
        .unwrap();

    assert_eq!(reply.response, "राशन कार्ड के लिए...");
    assert_eq!(reply.language, Locale::Hi);
    assert_eq!(
        reply.model_used.as_deref(),
        Some("meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo")
    );
}

#[tokio::test]
async fn server_error_is_upstream_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/voice"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": "Internal server error"
        })))
        .mount(&server)
        .await;

    let client = assistant_for_mock(&server.uri(), 5_000);
    let err = client.ask("hello", "en").await.unwrap_err();

    assert_eq!(
        err,
        AssistantError::UpstreamUnavailable {
            status: Some(500),
            message: "Internal server error".to_string(),
        }
    );
}

#[tokio::test]
async fn validation_failure_is_request_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/voice"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "error": "Query must be a non-empty string"
        })))
        .mount(&server)
        .await;

    let client = assistant_for_mock(&server.uri(), 5_000);
    let err = client.ask("hello", "en").await.unwrap_err();

    assert!(matches!(err, AssistantError::RequestRejected { status: 422, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn success_without_reply_is_empty_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/voice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(voice_success("   ", "en")))
        .mount(&server)
        .await;
    let client = assistant_for_mock(&server.uri(), 5_000);
    assert_eq!(client.ask("hello", "en").await, Err(AssistantError::EmptyReply));
}

#[tokio::test]
async fn success_with_unreadable_body_is_empty_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/voice"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = assistant_for_mock(&server.uri(), 5_000);
    assert_eq!(client.ask("hello", "en").await, Err(AssistantError::EmptyReply));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/voice"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(voice_success("late", "en"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = assistant_for_mock(&server.uri(), 200);
    let err = client.ask("hello", "en").await.unwrap_err();

    assert_eq!(err, AssistantError::Timeout(200));
}

#[tokio::test]
async fn invalid_input_never_reaches_the_network() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(voice_success("x", "en")))
        .expect(0)
        .mount(&server)
        .await;

    let client = assistant_for_mock(&server.uri(), 5_000);

    for (query, locale) in [("", "en"), ("   ", "hi"), ("hello", "fr"), ("hello", "EN")] {
        assert!(matches!(
            client.ask(query, locale).await,
            Err(AssistantError::InvalidInput(_))
        ));
    }
    let long = "क".repeat(501);
    assert!(matches!(
        client.ask(&long, "hi").await,
        Err(AssistantError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn unreachable_backend_is_upstream_unavailable() {
    // Nothing listens on the discard port
    let client = assistant_for_mock("http://127.0.0.1:9", 2_000);
    let err = client.ask("hello", "en").await.unwrap_err();

    assert!(matches!(
        err,
        AssistantError::UpstreamUnavailable { status: None, .. } | AssistantError::Timeout(_)
    ));
}

// =============================================================================
// ChatCompletionEngine
// =============================================================================

#[tokio::test]
async fn completion_sends_prompt_and_options() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "max_tokens": 300,
            "stream": false,
            "messages": [
                { "role": "system" },
                { "role": "user", "content": "राशन कार्ड कृपया उत्तर हिंदी में दें।" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_success(" उत्तर ")))
        .expect(1)
        .mount(&server)
        .await;

    let engine = completion_for_mock(&server.uri(), 5_000);
    let query = Query::parse("राशन कार्ड").unwrap();
    let completion = engine.answer(&query, Locale::Hi).await.unwrap();

    assert_eq!(completion.content, "उत्तर");
    assert_eq!(completion.model, "test-model");
}

#[tokio::test]
async fn completion_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let engine = completion_for_mock(&server.uri(), 5_000);
    let query = Query::parse("hello").unwrap();
    let err = engine.answer(&query, Locale::En).await.unwrap_err();

    assert!(matches!(err, CompletionError::Upstream { status: 429, .. }));
}

#[tokio::test]
async fn completion_without_content_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&server)
        .await;

    let engine = completion_for_mock(&server.uri(), 5_000);
    let query = Query::parse("hello").unwrap();
    let err = engine.answer(&query, Locale::En).await.unwrap_err();

    assert!(matches!(err, CompletionError::EmptyResponse));
}

#[tokio::test]
async fn completion_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_success("late"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let engine = completion_for_mock(&server.uri(), 200);
    let query = Query::parse("hello").unwrap();
    let err = engine.answer(&query, Locale::En).await.unwrap_err();

    assert!(matches!(err, CompletionError::Timeout(200)));
}

#[tokio::test]
async fn completion_without_key_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_success("x")))
        .expect(0)
        .mount(&server)
        .await;

    let engine = ChatCompletionEngine::new(CompletionConfig {
        base_url: server.uri(),
        ..Default::default()
    })
    .unwrap();

    assert!(!engine.is_configured());
    let query = Query::parse("hello").unwrap();
    assert!(matches!(
        engine.answer(&query, Locale::En).await,
        Err(CompletionError::MissingApiKey)
    ));
}
