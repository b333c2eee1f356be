//! Settings validation.
//!
//! Validation is a pure function from [`Settings`] to [`ValidatedSettings`]:
//! normalizations are applied to a copy, the caller's value is never touched.
//! Checks run in a fixed order and the first violation is returned.

use super::pages::{parse_pages, PageSelection};
use super::settings::Settings;
use crate::{Error, ErrorContext, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::debug;

static COMPLETIONS_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/chat/completions/?$").expect("static completions-suffix regex is valid")
});

/// Connection settings of the OpenAI-compatible backend.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiConfig {
    pub model: String,
    /// Service root, already stripped of any completion route.
    pub base_url: Option<String>,
    pub api_key: String,
}

/// The translation backend selected by the settings, together with its
/// credentials. Chosen once here and never re-inspected.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendConfig {
    OpenAi(OpenAiConfig),
}

impl BackendConfig {
    pub fn name(&self) -> &'static str {
        match self {
            BackendConfig::OpenAi(_) => "openai",
        }
    }
}

/// What the run is expected to do.
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    /// Verify required assets and exit
    Warmup,
    /// Package offline assets into the given directory and exit
    GenerateOfflineAssets(PathBuf),
    /// Translate documents with the selected backend
    Translate(BackendConfig),
}

/// Settings that passed every check. Read-only; dereferences to [`Settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSettings {
    settings: Settings,
    mode: RunMode,
    pages: PageSelection,
}

impl ValidatedSettings {
    pub fn mode(&self) -> &RunMode {
        &self.mode
    }

    pub fn backend(&self) -> Option<&BackendConfig> {
        match &self.mode {
            RunMode::Translate(backend) => Some(backend),
            _ => None,
        }
    }

    pub fn pages(&self) -> &PageSelection {
        &self.pages
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_inner(self) -> Settings {
        self.settings
    }
}

impl Deref for ValidatedSettings {
    type Target = Settings;

    fn deref(&self) -> &Settings {
        &self.settings
    }
}

impl Settings {
    /// Shorthand for [`validate`].
    pub fn validate(&self) -> Result<ValidatedSettings> {
        validate(self)
    }
}

fn config_error(msg: impl Into<String>, field: &str) -> Error {
    Error::configuration_with_context(
        msg,
        ErrorContext::new()
            .with_field_path(field)
            .with_source("settings_validator"),
    )
}

/// Validate `settings` and return the normalized copy.
pub fn validate(settings: &Settings) -> Result<ValidatedSettings> {
    let mut s = settings.clone();

    // Asset-only modes skip everything else.
    if s.basic.warmup {
        debug!("warmup mode, skipping settings validation");
        return Ok(ValidatedSettings {
            settings: s,
            mode: RunMode::Warmup,
            pages: PageSelection::all(),
        });
    }

    let generate = non_empty(s.basic.generate_offline_assets.as_deref());
    if generate.is_some() && non_empty(s.basic.restore_offline_assets.as_deref()).is_some() {
        return Err(config_error(
            "generate_offline_assets and restore_offline_assets cannot both be set",
            "basic.generate_offline_assets",
        ));
    }
    if let Some(dir) = generate {
        let dir = PathBuf::from(dir);
        debug!(dir = %dir.display(), "offline asset generation mode, skipping settings validation");
        return Ok(ValidatedSettings {
            settings: s,
            mode: RunMode::GenerateOfflineAssets(dir),
            pages: PageSelection::all(),
        });
    }

    let backend = select_backend(&mut s)?;
    check_input_files(&s)?;

    if s.pdf.no_dual && s.pdf.no_mono {
        return Err(config_error(
            "Cannot disable both dual and mono output modes",
            "pdf.no_mono",
        ));
    }

    check_pattern(s.pdf.formular_font_pattern.as_deref(), "pdf.formular_font_pattern")?;
    check_pattern(s.pdf.formular_char_pattern.as_deref(), "pdf.formular_char_pattern")?;

    if s.pdf.enhance_compatibility {
        s.pdf.skip_clean = true;
        s.pdf.disable_rich_text_translate = true;
    }

    check_bounds(&s)?;

    let pages = PageSelection::from_ranges(parse_pages(s.translation.pages.as_deref())?);

    debug!(backend = backend.name(), "settings validated");
    Ok(ValidatedSettings {
        settings: s,
        mode: RunMode::Translate(backend),
        pages,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Exactly one backend, with its credential; normalizes the endpoint in place
/// on the working copy.
fn select_backend(s: &mut Settings) -> Result<BackendConfig> {
    let selected: Vec<&'static str> = [("openai", s.openai)]
        .into_iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| name)
        .collect();

    match selected.as_slice() {
        [] => {
            return Err(config_error(
                "Must select a translation service: --openai",
                "openai",
            ))
        }
        [_] => {}
        many => {
            return Err(config_error(
                format!("Only one translation service may be selected, got: {}", many.join(", ")),
                "openai",
            ))
        }
    }

    let api_key = match non_empty(s.openai_detail.openai_api_key.as_deref()) {
        Some(key) => key.to_string(),
        None => {
            return Err(config_error(
                "OpenAI API key is required when using OpenAI service",
                "openai_detail.openai_api_key",
            ))
        }
    };

    let base_url = match non_empty(s.openai_detail.openai_base_url.as_deref()) {
        Some(raw) => {
            let root = normalize_base_url(raw);
            url::Url::parse(&root).map_err(|e| {
                Error::configuration_with_context(
                    format!("Invalid OpenAI base URL: {e}"),
                    ErrorContext::new()
                        .with_field_path("openai_detail.openai_base_url")
                        .with_details(raw.to_string())
                        .with_source("settings_validator"),
                )
            })?;
            Some(root)
        }
        None => None,
    };
    s.openai_detail.openai_base_url = base_url.clone();

    Ok(BackendConfig::OpenAi(OpenAiConfig {
        model: s.openai_detail.openai_model.clone(),
        base_url,
        api_key,
    }))
}

/// Strip a trailing `/chat/completions` route so the URL names the service root.
pub fn normalize_base_url(url: &str) -> String {
    COMPLETIONS_SUFFIX.replace(url, "").into_owned()
}

fn check_input_files(s: &Settings) -> Result<()> {
    for file in &s.basic.input_files {
        let path = Path::new(file.trim_matches(|c| c == '"' || c == '\''));
        if !path.exists() {
            return Err(Error::configuration_with_context(
                format!("File does not exist: {file}"),
                ErrorContext::new()
                    .with_field_path("basic.input_files")
                    .with_source("settings_validator"),
            ));
        }
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !is_pdf {
            return Err(Error::configuration_with_context(
                format!("File is not a PDF file: {file}"),
                ErrorContext::new()
                    .with_field_path("basic.input_files")
                    .with_source("settings_validator"),
            ));
        }
    }
    Ok(())
}

fn check_pattern(pattern: Option<&str>, field: &str) -> Result<()> {
    if let Some(p) = non_empty(pattern) {
        Regex::new(p).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid {}: {e}", field.rsplit('.').next().unwrap_or(field)),
                ErrorContext::new()
                    .with_field_path(field)
                    .with_details(p.to_string())
                    .with_source("settings_validator"),
            )
        })?;
    }
    Ok(())
}

// The watermark mode needs no runtime check: the enum rejects unknown values
// when the settings are deserialized.
fn check_bounds(s: &Settings) -> Result<()> {
    if let Some(max) = s.pdf.max_pages_per_part {
        if max < 1 {
            return Err(config_error(
                "max_pages_per_part must be greater than 0",
                "pdf.max_pages_per_part",
            ));
        }
    }

    if s.translation.qps < 1 {
        return Err(config_error("qps must be greater than 0", "translation.qps"));
    }

    if s.translation.min_text_length < 0 {
        return Err(config_error(
            "min_text_length must be greater than or equal to 0",
            "translation.min_text_length",
        ));
    }

    // Written so NaN fails too.
    if !(s.report_interval >= 0.05) {
        return Err(config_error(
            "report_interval must be greater than or equal to 0.05",
            "report_interval",
        ));
    }

    if s.pdf.split_short_lines && !(s.pdf.short_line_split_factor >= 0.1) {
        return Err(config_error(
            "short_line_split_factor must be greater than or equal to 0.1",
            "pdf.short_line_split_factor",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openai_settings() -> Settings {
        let mut s = Settings::default();
        s.openai = true;
        s.openai_detail.openai_api_key = Some("sk-test".into());
        s
    }

    fn field_of(err: &Error) -> Option<String> {
        err.context().and_then(|c| c.field_path.clone())
    }

    #[test]
    fn test_minimal_openai_settings_pass() {
        let v = validate(&openai_settings()).unwrap();
        match v.mode() {
            RunMode::Translate(BackendConfig::OpenAi(cfg)) => {
                assert_eq!(cfg.api_key, "sk-test");
                assert_eq!(cfg.model, "gpt-4o-mini");
                assert_eq!(cfg.base_url, None);
            }
            other => panic!("unexpected mode {other:?}"),
        }
        assert!(v.pages().is_unrestricted());
    }

    #[test]
    fn test_warmup_skips_all_checks() {
        let mut s = Settings::default();
        s.basic.warmup = true;
        s.pdf.no_dual = true;
        s.pdf.no_mono = true;
        s.translation.qps = 0;
        assert_eq!(validate(&s).unwrap().mode(), &RunMode::Warmup);
    }

    #[test]
    fn test_generate_offline_assets_skips_checks() {
        let mut s = Settings::default();
        s.basic.generate_offline_assets = Some("/tmp/assets".into());
        s.translation.qps = 0;
        assert_eq!(
            validate(&s).unwrap().mode(),
            &RunMode::GenerateOfflineAssets(PathBuf::from("/tmp/assets"))
        );
    }

    #[test]
    fn test_generate_and_restore_are_exclusive() {
        let mut s = Settings::default();
        s.basic.generate_offline_assets = Some("/tmp/out".into());
        s.basic.restore_offline_assets = Some("/tmp/in.zip".into());
        let err = validate(&s).unwrap_err();
        assert!(err.to_string().contains("cannot both be set"));
    }

    #[test]
    fn test_backend_required() {
        let err = validate(&Settings::default()).unwrap_err();
        assert_eq!(field_of(&err).as_deref(), Some("openai"));
    }

    #[test]
    fn test_backend_without_key_rejected() {
        let mut s = openai_settings();
        s.openai_detail.openai_api_key = Some(String::new());
        let err = validate(&s).unwrap_err();
        assert_eq!(field_of(&err).as_deref(), Some("openai_detail.openai_api_key"));
    }

    #[test]
    fn test_base_url_normalized_on_copy_only() {
        let mut s = openai_settings();
        s.openai_detail.openai_base_url = Some("https://llm.example.com/v1/chat/completions/".into());
        let v = validate(&s).unwrap();
        assert_eq!(
            v.openai_detail.openai_base_url.as_deref(),
            Some("https://llm.example.com/v1")
        );
        assert_eq!(
            v.backend(),
            Some(&BackendConfig::OpenAi(OpenAiConfig {
                model: "gpt-4o-mini".into(),
                base_url: Some("https://llm.example.com/v1".into()),
                api_key: "sk-test".into(),
            }))
        );
        assert_eq!(
            s.openai_detail.openai_base_url.as_deref(),
            Some("https://llm.example.com/v1/chat/completions/")
        );
    }

    #[test]
    fn test_base_url_without_suffix_untouched() {
        assert_eq!(normalize_base_url("https://a.example/v1"), "https://a.example/v1");
        assert_eq!(
            normalize_base_url("https://a.example/chat/completions/extra"),
            "https://a.example/chat/completions/extra"
        );
    }

    #[test]
    fn test_unparseable_base_url_rejected() {
        let mut s = openai_settings();
        s.openai_detail.openai_base_url = Some("not a url".into());
        let err = validate(&s).unwrap_err();
        assert_eq!(field_of(&err).as_deref(), Some("openai_detail.openai_base_url"));
    }

    #[test]
    fn test_input_files_checked() {
        let dir = std::env::temp_dir().join(format!("pdf-translate-val-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let pdf = dir.join("paper.PDF");
        let txt = dir.join("notes.txt");
        std::fs::write(&pdf, b"%PDF-1.7").unwrap();
        std::fs::write(&txt, b"hello").unwrap();

        let mut s = openai_settings();
        s.basic.input_files = vec![format!("\"{}\"", pdf.display())];
        assert!(validate(&s).is_ok());

        s.basic.input_files = vec![txt.display().to_string()];
        let err = validate(&s).unwrap_err();
        assert!(err.to_string().contains("not a PDF"));

        s.basic.input_files = vec![dir.join("missing.pdf").display().to_string()];
        let err = validate(&s).unwrap_err();
        assert!(err.to_string().contains("does not exist"));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_output_mode_combinations() {
        for (no_dual, no_mono) in [(false, false), (true, false), (false, true), (true, true)] {
            let mut s = openai_settings();
            s.pdf.no_dual = no_dual;
            s.pdf.no_mono = no_mono;
            assert_eq!(validate(&s).is_ok(), !(no_dual && no_mono));
        }
    }

    #[test]
    fn test_invalid_patterns_rejected() {
        let mut s = openai_settings();
        s.pdf.formular_font_pattern = Some("(CM[^R]".into());
        let err = validate(&s).unwrap_err();
        assert_eq!(field_of(&err).as_deref(), Some("pdf.formular_font_pattern"));

        let mut s = openai_settings();
        s.pdf.formular_char_pattern = Some("[a-".into());
        let err = validate(&s).unwrap_err();
        assert_eq!(field_of(&err).as_deref(), Some("pdf.formular_char_pattern"));

        let mut s = openai_settings();
        s.pdf.formular_font_pattern = Some("^(CM|MS)".into());
        assert!(validate(&s).is_ok());
    }

    #[test]
    fn test_enhance_compatibility_forces_flags() {
        let mut s = openai_settings();
        s.pdf.enhance_compatibility = true;
        let v = validate(&s).unwrap();
        assert!(v.pdf.skip_clean);
        assert!(v.pdf.disable_rich_text_translate);
        assert!(!s.pdf.skip_clean);
    }

    #[test]
    fn test_numeric_bounds() {
        let cases: Vec<(fn(&mut Settings), &str)> = vec![
            (|s| s.pdf.max_pages_per_part = Some(0), "pdf.max_pages_per_part"),
            (|s| s.translation.qps = 0, "translation.qps"),
            (|s| s.translation.min_text_length = -1, "translation.min_text_length"),
            (|s| s.report_interval = 0.01, "report_interval"),
            (|s| s.report_interval = f64::NAN, "report_interval"),
            (
                |s| {
                    s.pdf.split_short_lines = true;
                    s.pdf.short_line_split_factor = 0.05;
                },
                "pdf.short_line_split_factor",
            ),
        ];
        for (mutate, field) in cases {
            let mut s = openai_settings();
            mutate(&mut s);
            let err = validate(&s).unwrap_err();
            assert_eq!(field_of(&err).as_deref(), Some(field));
        }

        let mut s = openai_settings();
        s.pdf.short_line_split_factor = 0.0;
        s.translation.min_text_length = 0;
        s.report_interval = 0.05;
        s.pdf.max_pages_per_part = Some(1);
        assert!(validate(&s).is_ok());
    }

    #[test]
    fn test_pages_parsed_during_validation() {
        let mut s = openai_settings();
        s.translation.pages = Some("2-4,9".into());
        let v = validate(&s).unwrap();
        assert!(v.pages().contains(3));
        assert!(!v.pages().contains(5));

        s.translation.pages = Some("2,x".into());
        let err = validate(&s).unwrap_err();
        assert!(matches!(err, Error::PageRange(ref e) if e.token() == "x"));
    }

    #[test]
    fn test_first_violation_wins() {
        let mut s = openai_settings();
        s.pdf.no_dual = true;
        s.pdf.no_mono = true;
        s.translation.qps = 0;
        let err = validate(&s).unwrap_err();
        assert_eq!(field_of(&err).as_deref(), Some("pdf.no_mono"));
    }
}
