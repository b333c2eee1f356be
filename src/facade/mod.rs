//! Orchestrator-facing entry points.
//!
//! [`TranslationFacade`] is what document processing calls per segment;
//! [`BatchTranslator`] drives it for many segments at a bounded rate.

pub mod batch;
pub mod translator;

pub use batch::{BatchResult, BatchTranslator};
pub use translator::TranslationFacade;
