//! OpenAI backend against a mock HTTP server

use super::mock_server::MockServerFixture;
use mockito::Matcher;
use pdf_translate::error_code::BackendErrorClass;
use pdf_translate::{Error, TranslationBackend};
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_translate_over_http() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_completion("  Hallo Welt \n", 30, 4, 1).await;

    let backend = fixture.backend("de");
    let result = assert_ok!(backend.do_translate("Hello world").await);

    assert_eq!(result.text, "Hallo Welt");
    let usage = backend.usage().snapshot();
    assert_eq!((usage.total, usage.prompt, usage.completion), (34, 30, 4));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_request_body_shape() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "gpt-4o-mini",
            "temperature": 0.0,
            "messages": [{"role": "user", "content": "Say hi"}]
        })))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"hi"}}],"usage":{"prompt_tokens":2,"completion_tokens":1,"total_tokens":3}}"#)
        .create_async()
        .await;

    let backend = fixture.backend("en");
    let result = backend.do_llm_translate(Some("Say hi")).await.unwrap().unwrap();
    assert_eq!(result.text, "hi");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    let mut fixture = MockServerFixture::new().await;
    let throttled = fixture
        .mock_error(429, "rate_limit_exceeded", "Rate limit reached", 2)
        .await;
    let ok = fixture.mock_completion("bonjour", 5, 1, 1).await;

    let backend = fixture.backend("fr");
    let result = assert_ok!(backend.do_translate("hello").await);

    assert_eq!(result.text, "bonjour");
    throttled.assert_async().await;
    ok.assert_async().await;
    assert_eq!(backend.usage().snapshot().total, 6);
}

#[tokio::test]
async fn test_quota_exhausted_fails_on_first_response() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_error(429, "insufficient_quota", "You exceeded your current quota", 1)
        .await;

    let err = assert_err!(fixture.backend("fr").do_translate("hello").await);

    assert_eq!(err.backend_class(), Some(BackendErrorClass::QuotaExhausted));
    let ctx = err.context().unwrap();
    assert_eq!(ctx.status_code, Some(429));
    assert!(ctx.request_id.is_some());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_authentication_error_is_not_retried() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_error(401, "invalid_api_key", "Incorrect API key provided", 1)
        .await;

    let err = fixture.backend("fr").do_translate("hello").await.unwrap_err();

    assert!(matches!(
        err,
        Error::Backend {
            class: BackendErrorClass::Authentication,
            ..
        }
    ));
    assert!(err.to_string().contains("Incorrect API key provided"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = fixture.backend("fr").do_translate("hello").await.unwrap_err();
    assert_eq!(err.backend_class(), Some(BackendErrorClass::InvalidResponse));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let transport =
        pdf_translate::transport::HttpChatTransport::new(Some("http://127.0.0.1:1/v1"), "sk").unwrap();
    let backend = pdf_translate::backend::OpenAiBackend::with_transport(
        "gpt-4o-mini",
        "en",
        "zh",
        std::sync::Arc::new(transport),
    );
    let err = backend.do_translate("hello").await.unwrap_err();
    assert_eq!(err.backend_class(), Some(BackendErrorClass::Network));

    let ctx = err.context().expect("network errors carry call context");
    assert!(ctx.request_id.is_some());
    assert_eq!(ctx.source.as_deref(), Some("openai_http"));
    assert_eq!(ctx.details.as_deref(), Some("model: gpt-4o-mini"));
    assert_eq!(ctx.status_code, None);
}
