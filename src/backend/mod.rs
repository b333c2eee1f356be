//! # Translation backends
//!
//! A backend turns one string into its translation. Implementations declare
//! the parameters that influence their output through
//! [`TranslationBackend::cache_params`], which is the only input the facade
//! uses to address cached results.

pub mod openai;
pub mod prompt;

pub use openai::OpenAiBackend;

use crate::cache::CacheImpactParams;
use crate::config::{BackendConfig, RunMode, ValidatedSettings};
use crate::tokens::{TokenUsage, UsageCounters};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Translated text and the usage reported by the call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationResult {
    pub text: String,
    pub usage: TokenUsage,
}

#[async_trait]
pub trait TranslationBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cache-impact parameters, fixed at construction.
    fn cache_params(&self) -> &CacheImpactParams;

    /// Running usage totals of this instance.
    fn usage(&self) -> Arc<UsageCounters>;

    async fn do_translate(&self, text: &str) -> Result<TranslationResult>;

    /// Send `text` as a free-form prompt. `None` yields `None` without a call.
    async fn do_llm_translate(&self, text: Option<&str>) -> Result<Option<TranslationResult>>;
}

/// Build the backend selected by validated settings.
pub fn build_backend(
    settings: &ValidatedSettings,
    cancel: CancellationToken,
) -> Result<Arc<dyn TranslationBackend>> {
    let config = match settings.mode() {
        RunMode::Translate(config) => config,
        other => {
            return Err(Error::configuration_with_context(
                format!("settings do not describe a translation run: {other:?}"),
                ErrorContext::new().with_source("backend_builder"),
            ))
        }
    };

    let lang_in = &settings.translation.lang_in;
    let lang_out = &settings.translation.lang_out;
    let backend: Arc<dyn TranslationBackend> = match config {
        BackendConfig::OpenAi(openai) => Arc::new(
            OpenAiBackend::new(openai, lang_in, lang_out)?.with_cancellation(cancel),
        ),
    };
    info!(backend = backend.name(), lang_in = %lang_in, lang_out = %lang_out, "translation backend ready");
    Ok(backend)
}
