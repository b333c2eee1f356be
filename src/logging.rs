//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Directives appended to every filter: HTTP client internals stay quiet.
const QUIET_DEPENDENCIES: &[&str] = &["reqwest=warn", "hyper=warn", "h2=warn", "rustls=warn"];

/// Filter for a run: `RUST_LOG` wins, otherwise `info` (or `debug` when
/// `debug` is set) for this crate.
pub fn filter(debug: bool) -> EnvFilter {
    let default_level = if debug { "debug" } else { "info" };
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    for directive in QUIET_DEPENDENCIES {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }
    filter
}

/// Install the global fmt subscriber. A second call is a no-op.
pub fn init(debug: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_target(debug)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }

    #[test]
    fn test_filter_silences_http_stack() {
        let rendered = filter(true).to_string();
        assert!(rendered.contains("hyper=warn"));
        assert!(rendered.contains("reqwest=warn"));
    }
}
