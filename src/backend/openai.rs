//! OpenAI-compatible translation backend.

use super::prompt::{translation_prompt, translation_template};
use super::{TranslationBackend, TranslationResult};
use crate::cache::CacheImpactParams;
use crate::config::OpenAiConfig;
use crate::error_code::BackendErrorClass;
use crate::resilience::RetryPolicy;
use crate::tokens::UsageCounters;
use crate::transport::{ChatMessage, ChatRequest, ChatTransport, HttpChatTransport};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};

pub const BACKEND_NAME: &str = "openai";

/// Sampling would break formula placeholders, so the backend is deterministic.
const TEMPERATURE: f64 = 0.0;

/// Translation backend over an OpenAI-compatible chat-completion service.
///
/// Rate-limit responses are retried under [`RetryPolicy::rate_limit`]; every
/// other failure surfaces on first occurrence.
pub struct OpenAiBackend {
    model: String,
    lang_out: String,
    transport: Arc<dyn ChatTransport>,
    retry: RetryPolicy,
    cancel: CancellationToken,
    params: CacheImpactParams,
    usage: Arc<UsageCounters>,
}

impl OpenAiBackend {
    /// Backend talking HTTP to the configured endpoint.
    pub fn new(config: &OpenAiConfig, lang_in: &str, lang_out: &str) -> Result<Self> {
        let transport = HttpChatTransport::new(config.base_url.as_deref(), config.api_key.clone())?;
        Ok(Self::with_transport(
            &config.model,
            lang_in,
            lang_out,
            Arc::new(transport),
        ))
    }

    pub fn with_transport(
        model: &str,
        lang_in: &str,
        lang_out: &str,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        let params = CacheImpactParams::new(BACKEND_NAME, lang_in, lang_out)
            .param("temperature", TEMPERATURE)
            .param("model", model)
            .param("prompt", translation_template(lang_out));
        Self {
            model: model.to_string(),
            lang_out: lang_out.to_string(),
            transport,
            retry: RetryPolicy::rate_limit(),
            cancel: CancellationToken::new(),
            params,
            usage: Arc::new(UsageCounters::new()),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Abort in-flight retries when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: Vec<ChatMessage>, mode: &'static str) -> Result<TranslationResult> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(TEMPERATURE),
        };
        let span = info_span!(
            "openai_backend",
            model = %self.model,
            endpoint = self.transport.endpoint(),
            request_id = %request_id,
            mode
        );

        async {
            let completion = self
                .retry
                .run(&self.cancel, |_attempt| {
                    self.transport.complete(&request, &request_id)
                })
                .await?;

            // Billed tokens count even when the reply is unusable.
            self.usage.record(&completion.usage);

            let text = completion.content.ok_or_else(|| {
                Error::backend_with_context(
                    BackendErrorClass::InvalidResponse,
                    "completion carried no message content",
                    ErrorContext::new()
                        .with_source("openai_backend")
                        .with_request_id(request_id.clone())
                        .with_details(format!("model: {}", self.model)),
                )
            })?;

            debug!(
                total_tokens = completion.usage.effective_total(),
                prompt_tokens = completion.usage.prompt_tokens,
                completion_tokens = completion.usage.completion_tokens,
                "completion received"
            );

            Ok(TranslationResult {
                text: text.trim().to_string(),
                usage: completion.usage,
            })
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl TranslationBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn cache_params(&self) -> &CacheImpactParams {
        &self.params
    }

    fn usage(&self) -> Arc<UsageCounters> {
        Arc::clone(&self.usage)
    }

    async fn do_translate(&self, text: &str) -> Result<TranslationResult> {
        self.complete(translation_prompt(&self.lang_out, text), "translate")
            .await
    }

    async fn do_llm_translate(&self, text: Option<&str>) -> Result<Option<TranslationResult>> {
        let Some(text) = text else {
            return Ok(None);
        };
        self.complete(vec![ChatMessage::user(text)], "llm_translate")
            .await
            .map(Some)
    }
}
