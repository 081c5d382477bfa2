use super::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config() -> OpenAICompatibleConfig {
    OpenAICompatibleConfig {
        name: "test-cheap".to_string(),
        api_key: "test-key-123".to_string(),
        model: "MiniMax-M2".to_string(),
        base_url: "http://localhost".to_string(),
        temperature: 0.5,
        max_tokens: None,
        timeout: DEFAULT_CHEAP_TIMEOUT,
        probe_timeout: PROBE_TIMEOUT,
    }
}

fn create_backend_with_url(base_url: String) -> OpenAICompatibleBackend {
    let config = OpenAICompatibleConfig {
        base_url,
        ..create_test_config()
    };
    OpenAICompatibleBackend::new(config).unwrap()
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "model": "MiniMax-M2",
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
}

#[tokio::test]
async fn backend_sends_chat_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key-123"))
        .and(body_json(json!({
            "model": "MiniMax-M2",
            "messages": [
                { "role": "system", "content": "Be brief." },
                { "role": "user", "content": "Hello" }
            ],
            "temperature": 0.5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hi there!")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = create_backend_with_url(server.uri());
    let request = GenerationRequest::new("Hello").with_system_prompt(Some("Be brief."));
    let result = backend.generate(&request).await.unwrap();

    assert_eq!(result.response, "Hi there!");
    assert_eq!(result.model, "MiniMax-M2");
    assert_eq!(result.prompt_tokens, 10);
    assert_eq!(result.completion_tokens, 5);
}

#[tokio::test]
async fn backend_clamps_zero_temperature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({
            "model": "MiniMax-M2",
            "messages": [{ "role": "user", "content": "Hello" }],
            "temperature": 0.01,
            "max_tokens": 256
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAICompatibleBackend::new(OpenAICompatibleConfig {
        base_url: server.uri(),
        temperature: 0.0,
        max_tokens: Some(256),
        ..create_test_config()
    })
    .unwrap();

    assert!(backend.generate(&GenerationRequest::new("Hello")).await.is_ok());
}

#[test]
fn temperature_is_clamped_into_accepted_range() {
    assert_eq!(clamp_temperature(0.0), 0.01);
    assert_eq!(clamp_temperature(-3.0), 0.01);
    assert_eq!(clamp_temperature(0.4), 0.4);
    assert_eq!(clamp_temperature(1.0), 1.0);
    assert_eq!(clamp_temperature(1.7), 1.0);
    assert_eq!(clamp_temperature(f32::NAN), DEFAULT_CHEAP_TEMPERATURE);
}

#[tokio::test]
async fn backend_handles_missing_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "no usage here" } }]
        })))
        .mount(&server)
        .await;

    let result = create_backend_with_url(server.uri())
        .generate(&GenerationRequest::new("Hello"))
        .await
        .unwrap();

    assert_eq!(result.response, "no usage here");
    assert_eq!(result.model, "MiniMax-M2");
    assert_eq!(result.prompt_tokens, 0);
    assert_eq!(result.completion_tokens, 0);
}

#[tokio::test]
async fn backend_handles_missing_api_key() {
    let config = OpenAICompatibleConfig {
        api_key: String::new(),
        ..create_test_config()
    };
    let backend = OpenAICompatibleBackend::new(config).unwrap();

    let result = backend.generate(&GenerationRequest::new("test")).await;

    let error_msg = result.unwrap_err().to_string();
    assert!(error_msg.contains("API key not configured"));
    assert!(!backend.is_available().await);
}

#[tokio::test]
async fn backend_handles_network_error() {
    let backend = create_backend_with_url("http://127.0.0.1:9".to_string());

    let result = backend.generate(&GenerationRequest::new("test")).await;

    assert!(matches!(result, Err(LlmError::Network { .. })));
}

#[tokio::test]
async fn backend_handles_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal server error"))
        .expect(1)
        .mount(&server)
        .await;

    let err = create_backend_with_url(server.uri())
        .generate(&GenerationRequest::new("test"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("Internal server error"));
}

#[tokio::test]
async fn backend_rejects_empty_choices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = create_backend_with_url(server.uri())
        .generate(&GenerationRequest::new("test"))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::InvalidResponse { .. }));
}

#[tokio::test]
async fn backend_times_out_slow_responses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("late"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let backend = OpenAICompatibleBackend::new(OpenAICompatibleConfig {
        base_url: server.uri(),
        timeout: Duration::from_millis(50),
        ..create_test_config()
    })
    .unwrap();

    let err = backend.generate(&GenerationRequest::new("test")).await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn probe_uses_models_endpoint_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("Authorization", "Bearer test-key-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(create_backend_with_url(server.uri()).is_available().await);
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = create_backend_with_url(format!("{}/", server.uri()));
    assert!(backend.generate(&GenerationRequest::new("test")).await.is_ok());
}
