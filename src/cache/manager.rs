//! Cache manager.
//!
//! Wraps a [`TranslationCache`] with statistics and best-effort semantics:
//! backend failures are logged and counted, never returned.

use super::backend::TranslationCache;
use super::key::CacheFingerprint;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

pub struct CacheManager {
    backend: Arc<dyn TranslationCache>,
    stats: AtomicStats,
}

impl CacheManager {
    pub fn new(backend: Arc<dyn TranslationCache>) -> Self {
        Self {
            backend,
            stats: AtomicStats::default(),
        }
    }

    /// Cached value for `key`; a failing backend reads as a miss.
    pub async fn lookup(&self, key: &CacheFingerprint) -> Option<String> {
        match self.backend.get(key).await {
            Ok(Some(value)) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "cache hit");
                Some(value)
            }
            Ok(None) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "cache miss");
                None
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, cache = self.backend.name(), error = %e, "cache read failed");
                None
            }
        }
    }

    /// Store `value` under `key`; failures are logged and dropped.
    pub async fn store(&self, key: &CacheFingerprint, value: &str) {
        match self.backend.put(key, value).await {
            Ok(()) => {
                self.stats.stores.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, cache = self.backend.name(), error = %e, "cache write failed");
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}
