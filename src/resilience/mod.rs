//! # Resilience primitives
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`retry`] | Bounded exponential backoff for transient backend failures |
//! | [`rate_limiter`] | Token bucket bounding outgoing requests per second |
//!
//! ```rust
//! use pdf_translate::resilience::retry::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::rate_limit();
//! assert_eq!(policy.max_attempts(), 100);
//! assert_eq!(policy.backoff(3), Duration::from_secs(4));
//! assert_eq!(policy.backoff(10), Duration::from_secs(15));
//! ```

pub mod rate_limiter;
pub mod retry;

pub use rate_limiter::{RateLimiter, RateLimiterConfig, RateLimiterSnapshot};
pub use retry::{Decision, RetryPolicy};
