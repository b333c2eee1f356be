//! Load, validate and summarize a settings file.
//!
//! The file comes from `PDF_TRANSLATE_CONFIG` or the first argument. Exits
//! with status 1 when the settings are rejected.

use anyhow::Context;
use pdf_translate::config::{BackendConfig, RunMode, SettingsLoader};
use pdf_translate::logging;
use pdf_translate::transport::http::DEFAULT_OPENAI_BASE_URL;

fn main() -> anyhow::Result<()> {
    let path = std::env::var("PDF_TRANSLATE_CONFIG")
        .ok()
        .or_else(|| std::env::args().nth(1));

    let mut loader = SettingsLoader::new();
    if let Some(ref path) = path {
        loader = loader.with_file(path);
    }
    let settings = loader
        .load()
        .with_context(|| format!("loading {}", path.as_deref().unwrap_or("<defaults>")))?;
    logging::init(settings.basic.debug);

    let validated = match settings.validate() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    println!("✅ settings are valid");
    println!("  config file: {}", validated.config_file.as_deref().unwrap_or("-"));
    match validated.mode() {
        RunMode::Warmup => println!("  mode: warmup"),
        RunMode::GenerateOfflineAssets(dir) => {
            println!("  mode: generate offline assets into {}", dir.display())
        }
        RunMode::Translate(BackendConfig::OpenAi(cfg)) => {
            println!("  mode: translate");
            println!("  backend: openai ({})", cfg.model);
            println!(
                "  endpoint: {}",
                cfg.base_url.as_deref().unwrap_or(DEFAULT_OPENAI_BASE_URL)
            );
        }
    }
    println!(
        "  languages: {} -> {}",
        validated.translation.lang_in, validated.translation.lang_out
    );
    match validated.pages().ranges() {
        None => println!("  pages: all"),
        Some(ranges) => {
            let rendered: Vec<String> = ranges
                .iter()
                .map(|r| match r.end() {
                    Some(end) if end == r.start() => end.to_string(),
                    Some(end) => format!("{}-{}", r.start(), end),
                    None => format!("{}-", r.start()),
                })
                .collect();
            println!("  pages: {}", rendered.join(","));
        }
    }
    println!("  qps: {}", validated.translation.qps);
    println!("  input files: {}", validated.basic.input_files.len());
    Ok(())
}
