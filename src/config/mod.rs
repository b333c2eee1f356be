//! Settings: schema, loading, page expressions and validation.
//!
//! ```rust,no_run
//! use pdf_translate::config::SettingsLoader;
//!
//! # fn main() -> pdf_translate::Result<()> {
//! let settings = SettingsLoader::new().with_file("pdf-translate.yaml").load()?;
//! let validated = settings.validate()?;
//! println!("{:?}", validated.mode());
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod pages;
pub mod settings;
pub mod validation;

pub use loader::{SettingsLoader, DEFAULT_ENV_PREFIX};
pub use pages::{parse_pages, PageRange, PageRangeError, PageSelection, LAST_PAGE};
pub use settings::{
    BasicSettings, OpenAiSettings, PdfSettings, Settings, TranslationSettings,
    WatermarkOutputMode,
};
pub use validation::{
    normalize_base_url, validate, BackendConfig, OpenAiConfig, RunMode, ValidatedSettings,
};
