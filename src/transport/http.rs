use super::{ChatCompletion, ChatRequest, ChatTransport};
use crate::error_code::BackendErrorClass;
use crate::tokens::TokenUsage;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::Proxy;
use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// reqwest-based transport for OpenAI-compatible `/chat/completions` endpoints.
pub struct HttpChatTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpChatTransport {
    /// `base_url` is the service root (without `/chat/completions`); `None`
    /// means the public OpenAI endpoint.
    pub fn new(base_url: Option<&str>, api_key: impl Into<String>) -> Result<Self> {
        // Minimal production-friendly defaults (env-overridable).
        let timeout_secs = env_parse("PDF_TRANSLATE_HTTP_TIMEOUT_SECS").unwrap_or(120);

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(
                env_parse("PDF_TRANSLATE_HTTP_POOL_MAX_IDLE_PER_HOST").unwrap_or(32),
            )
            .pool_idle_timeout(Some(Duration::from_secs(
                env_parse("PDF_TRANSLATE_HTTP_POOL_IDLE_TIMEOUT_SECS").unwrap_or(90),
            )));

        if let Ok(proxy_url) = env::var("PDF_TRANSLATE_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        Ok(Self {
            client,
            base_url: base_url
                .unwrap_or(DEFAULT_OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}

#[derive(Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn complete(&self, request: &ChatRequest, request_id: &str) -> Result<ChatCompletion> {
        let ctx = || {
            ErrorContext::new()
                .with_source("openai_http")
                .with_request_id(request_id)
                .with_details(format!("model: {}", request.model))
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .header("x-client-request-id", request_id)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::backend_with_context(BackendErrorClass::Timeout, e.to_string(), ctx())
                } else {
                    Error::backend_with_context(BackendErrorClass::Network, e.to_string(), ctx())
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            Error::backend_with_context(
                BackendErrorClass::Network,
                format!("failed to read response body: {e}"),
                ctx().with_status_code(status),
            )
        })?;
        debug!(status, request_id, bytes = body.len(), "chat completion response");

        if !(200..300).contains(&status) {
            return Err(classify_failure(status, &body, ctx().with_status_code(status)));
        }

        let parsed: CompletionBody = serde_json::from_str(&body).map_err(|e| {
            Error::backend_with_context(
                BackendErrorClass::InvalidResponse,
                format!("malformed completion body: {e}"),
                ctx().with_status_code(status),
            )
        })?;
        let Some(choice) = parsed.choices.into_iter().next() else {
            return Err(Error::backend_with_context(
                BackendErrorClass::InvalidResponse,
                "completion contained no choices",
                ctx().with_status_code(status),
            ));
        };

        Ok(ChatCompletion {
            content: choice.message.content,
            usage: parsed.usage.unwrap_or_default(),
        })
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}

/// Map a non-2xx response to an error. Only 429 without a quota code is transient.
pub(crate) fn classify_failure(status: u16, body: &str, ctx: ErrorContext) -> Error {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let message = parsed
        .as_ref()
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("HTTP {status}")
            } else {
                body.to_string()
            }
        });
    let provider_class = parsed.as_ref().and_then(|e| {
        e.code
            .as_ref()
            .and_then(|c| c.as_str())
            .and_then(BackendErrorClass::from_provider_code)
            .or_else(|| e.kind.as_deref().and_then(BackendErrorClass::from_provider_code))
    });

    if status == 429 {
        return match provider_class {
            Some(BackendErrorClass::QuotaExhausted) => {
                Error::backend_with_context(BackendErrorClass::QuotaExhausted, message, ctx)
            }
            _ => Error::rate_limited_with_context(message, ctx),
        };
    }

    let class = provider_class.unwrap_or_else(|| BackendErrorClass::from_http_status(status));
    Error::backend_with_context(class, message, ctx)
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
