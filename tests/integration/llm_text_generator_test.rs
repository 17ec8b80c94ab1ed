// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scriptmint::domain::services::text_generator::{
    GenerationError, GenerationPrompt, TextGenerator,
};
use scriptmint::infrastructure::services::llm_text_generator::LlmTextGenerator;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn prompt() -> GenerationPrompt {
    GenerationPrompt {
        topic: "Podcast gear".to_string(),
        target_audience: Some("new podcasters".to_string()),
        tone: None,
    }
}

fn generator(server: &MockServer, api_key: Option<&str>) -> LlmTextGenerator {
    LlmTextGenerator::new(
        api_key.map(str::to_string),
        "test-model".to_string(),
        format!("{}/v1/", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_generate_returns_trimmed_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "test-model" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Hook. Body. CTA.\n" } }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 5 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let script = generator(&server, Some("sk-test"))
        .generate(&prompt())
        .await
        .unwrap();
    assert_eq!(script, "Hook. Body. CTA.");
}

#[tokio::test]
async fn test_upstream_error_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = generator(&server, Some("sk-test"))
        .generate(&prompt())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Failed(msg) if msg.contains("503")));
}

#[tokio::test]
async fn test_missing_content_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = generator(&server, Some("sk-test"))
        .generate(&prompt())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Failed(_)));
}

#[tokio::test]
async fn test_missing_api_key_never_calls_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = generator(&server, Some("  "))
        .generate(&prompt())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::NotConfigured));
}
