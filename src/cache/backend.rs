//! Cache backend implementations.

use super::key::CacheFingerprint;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Storage for finished translations, addressed by fingerprint.
///
/// Implementations need not be transactional: concurrent writers to one
/// fingerprint may race and the last write wins.
#[async_trait]
pub trait TranslationCache: Send + Sync {
    async fn get(&self, key: &CacheFingerprint) -> Result<Option<String>>;
    async fn put(&self, key: &CacheFingerprint, value: &str) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// In-process LRU cache.
pub struct MemoryCache {
    entries: Mutex<LruCache<CacheFingerprint, String>>,
}

impl MemoryCache {
    /// A capacity of zero is treated as one.
    pub fn new(max_entries: usize) -> Self {
        let cap = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(op: &str) -> Error {
    Error::cache_with_context(
        format!("memory cache lock poisoned during {op}"),
        ErrorContext::new().with_source("memory_cache"),
    )
}

#[async_trait]
impl TranslationCache for MemoryCache {
    async fn get(&self, key: &CacheFingerprint) -> Result<Option<String>> {
        let mut entries = self.entries.lock().map_err(|_| poisoned("get"))?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &CacheFingerprint, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned("put"))?;
        entries.put(key.clone(), value.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Cache that stores nothing.
#[derive(Debug, Default)]
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TranslationCache for NullCache {
    async fn get(&self, _: &CacheFingerprint) -> Result<Option<String>> {
        Ok(None)
    }
    async fn put(&self, _: &CacheFingerprint, _: &str) -> Result<()> {
        Ok(())
    }
    fn name(&self) -> &'static str {
        "null"
    }
}
