//! Mock OpenAI-compatible server for integration tests

use mockito::{Mock, Server, ServerGuard};
use pdf_translate::backend::OpenAiBackend;
use pdf_translate::resilience::RetryPolicy;
use pdf_translate::transport::HttpChatTransport;
use std::sync::Arc;
use std::time::Duration;

pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = format!("{}/v1", server.url());
        Self { server, base_url }
    }

    /// Backend pointed at the mock server, with millisecond backoff so
    /// rate-limit tests stay fast.
    pub fn backend(&self, lang_out: &str) -> OpenAiBackend {
        let transport = HttpChatTransport::new(Some(&self.base_url), "sk-test")
            .expect("failed to build transport");
        OpenAiBackend::with_transport("gpt-4o-mini", "en", lang_out, Arc::new(transport))
            .with_retry_policy(RetryPolicy::rate_limit().with_backoff(
                Duration::from_millis(5),
                Duration::from_millis(5),
                Duration::from_millis(20),
            ))
    }

    /// Successful completion returning `content` with the given usage,
    /// expected to be hit `hits` times.
    pub async fn mock_completion(
        &mut self,
        content: &str,
        prompt_tokens: u64,
        completion_tokens: u64,
        hits: usize,
    ) -> Mock {
        let body = serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": prompt_tokens,
                "completion_tokens": completion_tokens,
                "total_tokens": prompt_tokens + completion_tokens
            }
        });
        self.server
            .mock("POST", COMPLETIONS_PATH)
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(hits)
            .create_async()
            .await
    }

    /// OpenAI-style error envelope with the given status and code.
    pub async fn mock_error(&mut self, status: usize, code: &str, message: &str, hits: usize) -> Mock {
        let body = serde_json::json!({
            "error": {"message": message, "type": code, "code": code}
        });
        self.server
            .mock("POST", COMPLETIONS_PATH)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(hits)
            .create_async()
            .await
    }
}
