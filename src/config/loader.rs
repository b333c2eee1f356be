//! Settings loader with support for defaults, files, environment and overrides
//!
//! Sources are merged as JSON trees in that order, later sources winning, and
//! the merged tree is deserialized strictly into [`Settings`].

use super::settings::Settings;
use crate::{Error, ErrorContext, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default environment prefix, e.g. `PDF_TRANSLATE_QPS=8`.
pub const DEFAULT_ENV_PREFIX: &str = "PDF_TRANSLATE_";

#[derive(Debug, Clone, Copy)]
enum EnvKind {
    Str,
    Bool,
    Int,
    Float,
    /// Comma-separated list
    List,
}

/// Environment suffix -> settings path. Only these keys are read.
const ENV_TABLE: &[(&str, &str, EnvKind)] = &[
    ("DEBUG", "basic.debug", EnvKind::Bool),
    ("INPUT_FILES", "basic.input_files", EnvKind::List),
    ("PAGES", "translation.pages", EnvKind::Str),
    ("LANG_IN", "translation.lang_in", EnvKind::Str),
    ("LANG_OUT", "translation.lang_out", EnvKind::Str),
    ("OUTPUT", "translation.output", EnvKind::Str),
    ("QPS", "translation.qps", EnvKind::Int),
    ("MIN_TEXT_LENGTH", "translation.min_text_length", EnvKind::Int),
    ("IGNORE_CACHE", "translation.ignore_cache", EnvKind::Bool),
    ("REPORT_INTERVAL", "report_interval", EnvKind::Float),
    ("NO_DUAL", "pdf.no_dual", EnvKind::Bool),
    ("NO_MONO", "pdf.no_mono", EnvKind::Bool),
    ("WATERMARK_OUTPUT_MODE", "pdf.watermark_output_mode", EnvKind::Str),
    ("MAX_PAGES_PER_PART", "pdf.max_pages_per_part", EnvKind::Int),
    ("OPENAI", "openai", EnvKind::Bool),
    ("OPENAI_MODEL", "openai_detail.openai_model", EnvKind::Str),
    ("OPENAI_BASE_URL", "openai_detail.openai_base_url", EnvKind::Str),
    ("OPENAI_API_KEY", "openai_detail.openai_api_key", EnvKind::Str),
];

/// Un-prefixed variables used only when nothing else set the value.
const ENV_FALLBACKS: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "openai_detail.openai_api_key"),
    ("OPENAI_BASE_URL", "openai_detail.openai_base_url"),
];

/// Builder over the configuration sources.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
    env_prefix: Option<String>,
    overrides: Vec<(String, Value)>,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: Some(DEFAULT_ENV_PREFIX.to_string()),
            overrides: Vec::new(),
        }
    }

    /// Read a YAML (`.yaml`/`.yml`) or JSON (`.json`) settings file.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Ignore the environment entirely, fallbacks included.
    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// Set a dotted settings path (e.g. `"translation.qps"`) last.
    pub fn with_override(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.push((path.into(), value.into()));
        self
    }

    /// Load from the process environment.
    pub fn load(&self) -> Result<Settings> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Load with a custom environment lookup.
    pub fn load_with_env<F>(&self, lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut merged = serde_json::to_value(Settings::default())?;

        if let Some(ref path) = self.file {
            let doc = read_file(path)?;
            merge(&mut merged, doc);
            debug!(file = %path.display(), "merged settings file");
        }

        if let Some(ref prefix) = self.env_prefix {
            let mut applied = 0usize;
            for &(suffix, path, kind) in ENV_TABLE {
                let var = format!("{prefix}{suffix}");
                if let Some(raw) = lookup(&var) {
                    set_path(&mut merged, path, parse_env(&var, path, &raw, kind)?);
                    applied += 1;
                }
            }
            for &(var, path) in ENV_FALLBACKS {
                if get_path(&merged, path).map_or(true, Value::is_null) {
                    if let Some(raw) = lookup(var).filter(|v| !v.is_empty()) {
                        set_path(&mut merged, path, Value::String(raw));
                        applied += 1;
                    }
                }
            }
            debug!(prefix = %prefix, applied, "merged environment overrides");
        }

        for (path, value) in &self.overrides {
            set_path(&mut merged, path, value.clone());
        }

        let mut settings: Settings = serde_json::from_value(merged).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid settings: {e}"),
                ErrorContext::new()
                    .with_details(
                        self.file
                            .as_ref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "<merged sources>".to_string()),
                    )
                    .with_source("settings_loader"),
            )
        })?;
        if let Some(ref path) = self.file {
            settings.config_file = Some(path.display().to_string());
        }

        info!(
            config_file = settings.config_file.as_deref().unwrap_or("<none>"),
            overrides = self.overrides.len(),
            "settings loaded"
        );
        Ok(settings)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::configuration_with_context(
            format!("Failed to read settings file: {e}"),
            ErrorContext::new()
                .with_details(path.display().to_string())
                .with_source("settings_loader"),
        )
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let parsed = match ext.as_deref() {
        Some("json") => serde_json::from_str::<Value>(&content).map_err(|e| e.to_string()),
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str::<Value>(&content).map_err(|e| e.to_string())
        }
        _ => {
            return Err(Error::configuration_with_context(
                "Unsupported settings file type, expected .yaml, .yml or .json",
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("settings_loader"),
            ))
        }
    };

    match parsed {
        // An empty YAML document parses as null.
        Ok(Value::Null) => Ok(Value::Object(Map::new())),
        Ok(v @ Value::Object(_)) => Ok(v),
        Ok(_) => Err(Error::configuration_with_context(
            "Settings file must contain a mapping at the top level",
            ErrorContext::new()
                .with_details(path.display().to_string())
                .with_source("settings_loader"),
        )),
        Err(e) => Err(Error::configuration_with_context(
            format!("Failed to parse settings file: {e}"),
            ErrorContext::new()
                .with_details(path.display().to_string())
                .with_source("settings_loader"),
        )),
    }
}

fn parse_env(var: &str, path: &str, raw: &str, kind: EnvKind) -> Result<Value> {
    let invalid = |expected: &str| {
        Error::configuration_with_context(
            format!("{var} must be {expected}, got {raw:?}"),
            ErrorContext::new()
                .with_field_path(path)
                .with_source("settings_loader"),
        )
    };
    let value = match kind {
        EnvKind::Str => Value::String(raw.to_string()),
        EnvKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Value::Bool(true),
            "0" | "false" | "no" | "off" | "" => Value::Bool(false),
            _ => return Err(invalid("a boolean")),
        },
        EnvKind::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid("an integer"))?,
        EnvKind::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| invalid("a number"))?,
        EnvKind::List => Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        ),
    };
    Ok(value)
}

/// Deep merge: objects merge key by key, anything else replaces.
pub(crate) fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn set_path(root: &mut Value, path: &str, value: Value) {
    let mut node = root;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        node = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, segment| node.get(segment))
}
