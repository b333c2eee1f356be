//! Settings structures
//!
//! The schema is strict: unknown keys are rejected at every level. Keys that a
//! newer tool version understands but this one does not belong under the
//! top-level `extra` map, which is carried through untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

/// Watermark output mode for translated PDF files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatermarkOutputMode {
    /// Add a watermark to the translated PDF
    #[default]
    Watermarked,
    /// Don't add a watermark
    NoWatermark,
    /// Output both watermarked and non-watermarked versions
    Both,
}

impl WatermarkOutputMode {
    pub const ALL: [WatermarkOutputMode; 3] = [Self::Watermarked, Self::NoWatermark, Self::Both];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Watermarked => "watermarked",
            Self::NoWatermark => "no_watermark",
            Self::Both => "both",
        }
    }
}

impl FromStr for WatermarkOutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid watermark output mode: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BasicSettings {
    /// Input PDF files to process
    pub input_files: Vec<String>,
    /// Enable debug logging
    pub debug: bool,
    /// Enable GUI mode (handled by the shell, carried for completeness)
    pub gui: bool,
    /// Only download and verify required assets then exit
    pub warmup: bool,
    /// Generate an offline assets package in this directory
    pub generate_offline_assets: Option<String>,
    /// Restore an offline assets package from this file
    pub restore_offline_assets: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslationSettings {
    /// Pages to translate (e.g. "1,2,1-,-3,3-5")
    pub pages: Option<String>,
    /// Minimum text length to translate
    pub min_text_length: i64,
    /// RPC service host address for document layout analysis
    pub rpc_doclayout: Option<String>,
    /// Source language code
    pub lang_in: String,
    /// Target language code
    pub lang_out: String,
    /// Output directory for translated files
    pub output: Option<String>,
    /// Requests-per-second ceiling for the translation service
    pub qps: i64,
    /// Bypass the translation cache entirely
    pub ignore_cache: bool,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            pages: None,
            min_text_length: 5,
            rpc_doclayout: None,
            lang_in: "auto".to_string(),
            lang_out: "zh".to_string(),
            output: None,
            qps: 4,
            ignore_cache: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PdfSettings {
    pub no_dual: bool,
    pub no_mono: bool,
    /// Font pattern identifying formula text
    pub formular_font_pattern: Option<String>,
    /// Character pattern identifying formula text
    pub formular_char_pattern: Option<String>,
    pub split_short_lines: bool,
    pub short_line_split_factor: f64,
    pub skip_clean: bool,
    pub dual_translate_first: bool,
    pub disable_rich_text_translate: bool,
    /// Turns on every compatibility option
    pub enhance_compatibility: bool,
    pub use_alternating_pages_dual: bool,
    pub watermark_output_mode: WatermarkOutputMode,
    pub max_pages_per_part: Option<i64>,
    pub translate_table_text: bool,
    pub skip_scanned_detection: bool,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            no_dual: false,
            no_mono: false,
            formular_font_pattern: None,
            formular_char_pattern: None,
            split_short_lines: false,
            short_line_split_factor: 0.8,
            skip_clean: false,
            dual_translate_first: false,
            disable_rich_text_translate: false,
            enhance_compatibility: false,
            use_alternating_pages_dual: false,
            watermark_output_mode: WatermarkOutputMode::default(),
            max_pages_per_part: None,
            translate_table_text: true,
            skip_scanned_detection: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenAiSettings {
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            openai_model: "gpt-4o-mini".to_string(),
            openai_base_url: None,
            openai_api_key: None,
        }
    }
}

/// Complete settings graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Path of the file these settings were loaded from
    pub config_file: Option<String>,
    /// Progress report interval in seconds
    pub report_interval: f64,
    /// Use OpenAI for translation
    pub openai: bool,
    pub basic: BasicSettings,
    pub translation: TranslationSettings,
    pub pdf: PdfSettings,
    pub openai_detail: OpenAiSettings,
    /// Unrecognized keys, kept verbatim
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_file: None,
            report_interval: 0.1,
            openai: false,
            basic: BasicSettings::default(),
            translation: TranslationSettings::default(),
            pdf: PdfSettings::default(),
            openai_detail: OpenAiSettings::default(),
            extra: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Output directory for translated files, created if missing.
    ///
    /// Falls back to the current working directory.
    pub fn output_dir(&self) -> std::io::Result<PathBuf> {
        let dir = match self.translation.output.as_deref() {
            Some(out) if !out.is_empty() => PathBuf::from(out),
            _ => std::env::current_dir()?,
        };
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
