//! Batch translation.

use super::translator::TranslationFacade;
use crate::config::ValidatedSettings;
use crate::resilience::{RateLimiter, RateLimiterConfig};
use crate::Error;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Per-segment outcomes of one batch, each tagged with its input index.
#[derive(Debug)]
pub struct BatchResult<T, E> {
    pub successes: Vec<(usize, T)>,
    pub failures: Vec<(usize, E)>,
    pub execution_time: Duration,
    pub total_processed: usize,
}

impl<T, E> BatchResult<T, E> {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Translates many segments through one facade, with bounded concurrency and
/// an optional requests-per-second ceiling. One failing segment does not
/// affect the others.
pub struct BatchTranslator {
    facade: Arc<TranslationFacade>,
    limiter: Option<Arc<RateLimiter>>,
    max_concurrency: usize,
}

impl BatchTranslator {
    pub fn new(facade: Arc<TranslationFacade>) -> Self {
        Self {
            facade,
            limiter: None,
            max_concurrency: 4,
        }
    }

    /// Limit to `qps` requests per second with as many in flight. Values below
    /// one leave the batch unthrottled.
    pub fn with_qps(mut self, qps: i64) -> Self {
        if let Some(cfg) = RateLimiterConfig::from_qps(qps) {
            self.limiter = Some(Arc::new(RateLimiter::new(cfg)));
            self.max_concurrency = qps as usize;
        }
        self
    }

    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    pub fn from_settings(facade: Arc<TranslationFacade>, settings: &ValidatedSettings) -> Self {
        Self::new(facade).with_qps(settings.translation.qps)
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Translate every segment. Results are reported by input index, in order.
    pub async fn translate_all<S>(&self, segments: Vec<S>) -> BatchResult<String, Error>
    where
        S: AsRef<str>,
    {
        let start = Instant::now();
        let total = segments.len();

        let mut outcomes: Vec<(usize, crate::Result<String>)> = stream::iter(segments.into_iter().enumerate())
            .map(|(i, segment)| {
                let facade = Arc::clone(&self.facade);
                let limiter = self.limiter.clone();
                async move {
                    if let Some(limiter) = limiter {
                        limiter.acquire().await;
                    }
                    (i, facade.translate(segment.as_ref()).await)
                }
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;
        outcomes.sort_by_key(|(i, _)| *i);

        let mut successes = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for (i, outcome) in outcomes {
            match outcome {
                Ok(text) => successes.push((i, text)),
                Err(e) => failures.push((i, e)),
            }
        }
        let result = BatchResult {
            successes,
            failures,
            execution_time: start.elapsed(),
            total_processed: total,
        };

        info!(
            total,
            failed = result.failure_count(),
            elapsed_ms = result.execution_time.as_millis() as u64,
            "batch translated"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{TranslationBackend, TranslationResult};
    use crate::cache::{CacheImpactParams, NullCache};
    use crate::error_code::BackendErrorClass;
    use crate::tokens::{TokenUsage, UsageCounters};
    use crate::{ErrorContext, Result};
    use async_trait::async_trait;

    struct EchoBackend {
        params: CacheImpactParams,
        usage: Arc<UsageCounters>,
    }

    #[async_trait]
    impl TranslationBackend for EchoBackend {
        fn name(&self) -> &'static str {
            "echo"
        }
        fn cache_params(&self) -> &CacheImpactParams {
            &self.params
        }
        fn usage(&self) -> Arc<UsageCounters> {
            self.usage.clone()
        }
        async fn do_translate(&self, text: &str) -> Result<TranslationResult> {
            if text == "boom" {
                return Err(Error::backend_with_context(
                    BackendErrorClass::InvalidRequest,
                    "refused",
                    ErrorContext::new(),
                ));
            }
            let usage = TokenUsage::new(1, 1);
            self.usage.record(&usage);
            Ok(TranslationResult {
                text: format!("<{text}>"),
                usage,
            })
        }
        async fn do_llm_translate(&self, _: Option<&str>) -> Result<Option<TranslationResult>> {
            Ok(None)
        }
    }

    fn facade() -> Arc<TranslationFacade> {
        let backend = Arc::new(EchoBackend {
            params: CacheImpactParams::new("echo", "en", "zh"),
            usage: Arc::new(UsageCounters::new()),
        });
        Arc::new(TranslationFacade::new(backend, Arc::new(NullCache::new())))
    }

    #[tokio::test]
    async fn test_failures_are_isolated_by_index() {
        let batch = BatchTranslator::new(facade()).with_max_concurrency(3);
        let result = batch.translate_all(vec!["a", "boom", "c", "d"]).await;

        assert_eq!(result.total_processed, 4);
        assert_eq!(
            result.successes,
            vec![(0, "<a>".to_string()), (2, "<c>".to_string()), (3, "<d>".to_string())]
        );
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.failures[0].0, 1);
        assert_eq!(result.success_count(), 3);
    }

    #[tokio::test]
    async fn test_usage_sums_across_concurrent_segments() {
        let facade = facade();
        let batch = BatchTranslator::new(facade.clone()).with_max_concurrency(8);
        let segments: Vec<String> = (0..50).map(|i| format!("s{i}")).collect();
        let result = batch.translate_all(segments).await;
        assert!(result.all_succeeded());

        let usage = facade.usage();
        assert_eq!((usage.total, usage.prompt, usage.completion), (100, 50, 50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_qps_bounds_throughput() {
        let batch = BatchTranslator::new(facade()).with_qps(2);
        assert_eq!(batch.max_concurrency(), 2);

        let start = tokio::time::Instant::now();
        let result = batch.translate_all(vec!["a", "b", "c", "d", "e", "f"]).await;
        assert!(result.all_succeeded());
        // burst of 2, then 4 more at 2/s
        assert!(start.elapsed() >= Duration::from_millis(1900));
    }
}
