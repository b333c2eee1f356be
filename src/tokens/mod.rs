//! # Token usage
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`TokenUsage`] | Usage reported by a single call |
//! | [`UsageCounters`] | Lock-free running totals owned by a backend |
//! | [`UsageSnapshot`] | Readable copy of the totals |
//! | [`UsageReporter`] | Background task logging totals as they change |
//!
//! ```rust
//! use pdf_translate::tokens::{TokenUsage, UsageCounters};
//!
//! let counters = UsageCounters::new();
//! counters.record(&TokenUsage::new(12, 30));
//! assert_eq!(counters.snapshot().total, 42);
//! ```

mod reporter;
mod usage;

pub use reporter::UsageReporter;
pub use usage::{TokenUsage, UsageCounters, UsageSnapshot};
