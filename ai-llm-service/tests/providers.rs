use ai_llm_service::error_handler::{ProviderError, ProviderErrorKind};
use ai_llm_service::services::ollama_service::OllamaService;
use ai_llm_service::services::open_ai_service::OpenAiService;
use ai_llm_service::{AiLlmError, LlmModelConfig, LlmProvider, LlmServiceProfiles};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ollama_cfg(endpoint: &str, model: &str) -> LlmModelConfig {
    LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: model.into(),
        endpoint: endpoint.into(),
        api_key: None,
        max_tokens: None,
        temperature: Some(0.7),
        top_p: None,
        timeout_secs: Some(5),
    }
}

fn openai_cfg(endpoint: &str, model: &str) -> LlmModelConfig {
    LlmModelConfig {
        provider: LlmProvider::OpenAI,
        api_key: Some("sk-test".into()),
        ..ollama_cfg(endpoint, model)
    }
}

#[tokio::test]
async fn ollama_generate_sends_system_and_temperature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "mistral",
            "prompt": "What plans do you have?",
            "system": "You are ClassyBot.",
            "stream": false,
            "options": { "temperature": 0.25 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "mistral",
            "response": "We offer fiber plans.",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let svc = OllamaService::new(ollama_cfg(&server.uri(), "mistral")).unwrap();
    let out = svc
        .generate("What plans do you have?", Some("You are ClassyBot."), Some(0.25))
        .await
        .unwrap();
    assert_eq!(out, "We offer fiber plans.");
}

#[tokio::test]
async fn ollama_non_success_status_is_reported_with_snippet() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed\nstack"))
        .mount(&server)
        .await;

    let svc = OllamaService::new(ollama_cfg(&server.uri(), "mistral")).unwrap();
    let err = svc.generate("hi", None, None).await.unwrap_err();
    match err {
        AiLlmError::Provider(ProviderError {
            provider: LlmProvider::Ollama,
            kind: ProviderErrorKind::HttpStatus(http),
        }) => {
            assert_eq!(http.status.as_u16(), 500);
            assert_eq!(http.snippet, "model crashed stack");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn ollama_embeddings_use_prompt_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_partial_json(json!({ "model": "nomic-embed-text", "prompt": "router" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embedding": [0.1, 0.2, 0.3] })))
        .mount(&server)
        .await;

    let svc = OllamaService::new(ollama_cfg(&server.uri(), "nomic-embed-text")).unwrap();
    let v = svc.embeddings("router").await.unwrap();
    assert_eq!(v.len(), 3);
}

#[tokio::test]
async fn openai_chat_sends_bearer_and_system_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                { "role": "system", "content": "sys" },
                { "role": "user", "content": "hello there" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [ { "message": { "role": "assistant", "content": "Hi!" } } ]
        })))
        .mount(&server)
        .await;

    let svc = OpenAiService::new(openai_cfg(&server.uri(), "gpt-4o-mini")).unwrap();
    let out = svc.generate("hello there", Some("sys"), None).await.unwrap();
    assert_eq!(out, "Hi!");
}

#[tokio::test]
async fn openai_empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let svc = OpenAiService::new(openai_cfg(&server.uri(), "gpt-4o-mini")).unwrap();
    let err = svc.generate("q", None, None).await.unwrap_err();
    assert!(matches!(
        err,
        AiLlmError::Provider(ProviderError {
            kind: ProviderErrorKind::EmptyChoices,
            ..
        })
    ));
}

#[tokio::test]
async fn openai_null_first_choice_is_empty_choices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": null } },
                { "message": { "role": "assistant", "content": "second" } }
            ]
        })))
        .mount(&server)
        .await;

    let svc = OpenAiService::new(openai_cfg(&server.uri(), "gpt-4o-mini")).unwrap();
    let err = svc.generate("q", None, None).await.unwrap_err();
    assert!(matches!(
        err,
        AiLlmError::Provider(ProviderError {
            kind: ProviderErrorKind::EmptyChoices,
            ..
        })
    ));
}

#[tokio::test]
async fn openai_error_status_keeps_body_snippet() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let svc = OpenAiService::new(openai_cfg(&server.uri(), "gpt-4o-mini")).unwrap();
    match svc.generate("q", None, None).await.unwrap_err() {
        AiLlmError::Provider(ProviderError {
            kind: ProviderErrorKind::HttpStatus(http),
            ..
        }) => {
            assert_eq!(http.status.as_u16(), 401);
            assert_eq!(http.snippet, "invalid api key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn openai_embeddings_send_bearer_and_return_first_vector() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "text-embedding-3-small",
            "input": "fiber plans"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "embedding": [0.5, 0.25] } ]
        })))
        .mount(&server)
        .await;

    let svc = OpenAiService::new(openai_cfg(&server.uri(), "text-embedding-3-small")).unwrap();
    assert_eq!(svc.embeddings("fiber plans").await.unwrap(), vec![0.5, 0.25]);
}

#[test]
fn openai_requires_api_key() {
    let mut cfg = openai_cfg("https://api.openai.com", "gpt-4o-mini");
    cfg.api_key = None;
    assert!(OpenAiService::new(cfg).is_err());
}

#[tokio::test]
async fn profiles_route_chat_and_embedding_and_report_health() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "model": "mistral" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_partial_json(json!({ "model": "nomic-embed-text" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embedding": [1.0, 0.0] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [ { "name": "mistral:latest" } ]
        })))
        .mount(&server)
        .await;

    let svc = LlmServiceProfiles::new(
        ollama_cfg(&server.uri(), "mistral"),
        ollama_cfg(&server.uri(), "nomic-embed-text"),
        Some(5),
    )
    .unwrap();

    assert_eq!(svc.generate("q", None, None).await.unwrap(), "ok");
    assert_eq!(svc.embed("q").await.unwrap(), vec![1.0, 0.0]);

    let health = svc.health_all().await;
    assert_eq!(health.len(), 2);
    assert!(health[0].ok, "chat model is listed as mistral:latest");
    assert!(!health[1].ok, "embedding model is not listed");
    assert_eq!(health[0].provider, "Ollama");
}

#[tokio::test]
async fn health_of_unreachable_backend_is_not_ok() {
    let svc = LlmServiceProfiles::new(
        ollama_cfg("http://127.0.0.1:9", "mistral"),
        ollama_cfg("http://127.0.0.1:9", "mistral"),
        Some(1),
    )
    .unwrap();

    let health = svc.health_all().await;
    assert_eq!(health.len(), 1);
    assert!(!health[0].ok);
}
