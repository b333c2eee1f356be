//! # pdf-translate
//!
//! Translation core for text extracted from PDF documents: validated settings,
//! pluggable translation backends, a content-addressed cache that avoids
//! paying twice for the same segment, lock-free token accounting and
//! rate-limit aware retries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_translate::cache::MemoryCache;
//! use pdf_translate::config::SettingsLoader;
//! use pdf_translate::TranslationFacade;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> pdf_translate::Result<()> {
//!     let settings = SettingsLoader::new()
//!         .with_override("openai", true)
//!         .with_override("translation.lang_out", "de")
//!         .load()?
//!         .validate()?;
//!
//!     let facade = TranslationFacade::from_settings(
//!         &settings,
//!         Arc::new(MemoryCache::new(10_000)),
//!         CancellationToken::new(),
//!     )?;
//!
//!     let text = facade.translate("The quick brown fox.").await?;
//!     println!("{text} ({} tokens)", facade.usage().total);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Settings schema, loading, page ranges and validation |
//! | [`backend`] | Translation backend trait and the OpenAI implementation |
//! | [`cache`] | Fingerprints and cache storage |
//! | [`facade`] | Cache-first translation and batching |
//! | [`resilience`] | Retry policy and rate limiter |
//! | [`tokens`] | Token usage counters and reporting |
//! | [`transport`] | Chat-completion HTTP transport |
//! | [`logging`] | Tracing subscriber setup |

pub mod backend;
pub mod cache;
pub mod config;
pub mod error_code;
pub mod facade;
pub mod logging;
pub mod resilience;
pub mod tokens;
pub mod transport;

// Re-export main types for convenience
pub use backend::{TranslationBackend, TranslationResult};
pub use config::{Settings, SettingsLoader, ValidatedSettings};
pub use facade::{BatchTranslator, TranslationFacade};
pub use tokens::{UsageCounters, UsageSnapshot};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
