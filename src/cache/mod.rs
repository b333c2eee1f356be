//! # Translation cache
//!
//! Finished translations are stored under a content fingerprint so that a
//! repeated segment never costs a second paid API call.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheImpactParams`] | Ordered parameters that change a backend's output |
//! | [`CacheFingerprint`] | SHA-256 address of one entry |
//! | [`TranslationCache`] | Trait for cache storage |
//! | [`MemoryCache`] | In-memory LRU implementation |
//! | [`NullCache`] | No-op implementation |
//! | [`CacheManager`] | Best-effort wrapper with statistics |
//!
//! ## Example
//!
//! ```rust
//! use pdf_translate::cache::{CacheImpactParams, FingerprintMode};
//!
//! let params = CacheImpactParams::new("openai", "en", "zh")
//!     .param("model", "gpt-4o-mini")
//!     .param("temperature", 0.0);
//! let a = params.fingerprint(FingerprintMode::Translate, "Hello");
//! let b = params.fingerprint(FingerprintMode::Llm, "Hello");
//! assert_ne!(a, b);
//! ```

mod backend;
mod key;
mod manager;

pub use backend::{MemoryCache, NullCache, TranslationCache};
pub use key::{CacheFingerprint, CacheImpactParams, FingerprintMode};
pub use manager::{CacheManager, CacheStats};
