//! Cache-first translation entry point.

use crate::backend::{build_backend, TranslationBackend};
use crate::cache::{CacheManager, CacheStats, FingerprintMode, TranslationCache};
use crate::config::ValidatedSettings;
use crate::tokens::{UsageCounters, UsageSnapshot};
use crate::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument, Span};

/// Orchestrates cache lookup, backend call and cache store.
///
/// Shareable across tasks; concurrent misses on one fingerprint may both call
/// the backend, the last store wins.
pub struct TranslationFacade {
    backend: Arc<dyn TranslationBackend>,
    cache: CacheManager,
    ignore_cache: bool,
    span: Span,
}

impl TranslationFacade {
    pub fn new(backend: Arc<dyn TranslationBackend>, cache: Arc<dyn TranslationCache>) -> Self {
        let span = info_span!(
            "translation_facade",
            backend = backend.name(),
            cache = cache.name()
        );
        Self {
            backend,
            cache: CacheManager::new(cache),
            ignore_cache: false,
            span,
        }
    }

    /// Bypass the cache for every call.
    pub fn with_ignore_cache(mut self, ignore_cache: bool) -> Self {
        self.ignore_cache = ignore_cache;
        self
    }

    /// Backend from `settings`, cache bypass from `translation.ignore_cache`.
    pub fn from_settings(
        settings: &ValidatedSettings,
        cache: Arc<dyn TranslationCache>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let backend = build_backend(settings, cancel)?;
        Ok(Self::new(backend, cache).with_ignore_cache(settings.translation.ignore_cache))
    }

    pub async fn translate(&self, text: &str) -> Result<String> {
        self.translate_with_options(text, false).await
    }

    /// Translate `text`, skipping the cache when `ignore_cache` is set here or
    /// on the facade.
    pub async fn translate_with_options(&self, text: &str, ignore_cache: bool) -> Result<String> {
        let use_cache = !(self.ignore_cache || ignore_cache);
        async {
            let key = self
                .backend
                .cache_params()
                .fingerprint(FingerprintMode::Translate, text);

            if use_cache {
                if let Some(hit) = self.cache.lookup(&key).await {
                    return Ok(hit);
                }
            }

            let result = self.backend.do_translate(text).await?;
            debug!(
                chars_in = text.len(),
                chars_out = result.text.len(),
                tokens = result.usage.effective_total(),
                "translated segment"
            );

            if use_cache {
                self.cache.store(&key, &result.text).await;
            }
            Ok(result.text)
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn llm_translate(&self, text: Option<&str>) -> Result<Option<String>> {
        self.llm_translate_with_options(text, false).await
    }

    /// Free-form prompt with the same cache discipline as
    /// [`translate`](Self::translate), under its own fingerprint mode.
    pub async fn llm_translate_with_options(
        &self,
        text: Option<&str>,
        ignore_cache: bool,
    ) -> Result<Option<String>> {
        let Some(text) = text else {
            return Ok(None);
        };
        let use_cache = !(self.ignore_cache || ignore_cache);
        async {
            let key = self
                .backend
                .cache_params()
                .fingerprint(FingerprintMode::Llm, text);

            if use_cache {
                if let Some(hit) = self.cache.lookup(&key).await {
                    return Ok(Some(hit));
                }
            }

            let Some(result) = self.backend.do_llm_translate(Some(text)).await? else {
                return Ok(None);
            };
            if use_cache {
                self.cache.store(&key, &result.text).await;
            }
            Ok(Some(result.text))
        }
        .instrument(self.span.clone())
        .await
    }

    pub fn usage(&self) -> UsageSnapshot {
        self.backend.usage().snapshot()
    }

    pub fn usage_counters(&self) -> Arc<UsageCounters> {
        self.backend.usage()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn backend(&self) -> &Arc<dyn TranslationBackend> {
        &self.backend
    }
}
