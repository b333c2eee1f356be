use crate::config::pages::PageRangeError;
use crate::error_code::BackendErrorClass;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Settings key that caused the error (e.g., "translation.qps", "pdf.formular_font_pattern")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., offending value, upstream message)
    pub details: Option<String>,
    /// Source of the error (e.g., "settings_validator", "openai_backend")
    pub source: Option<String>,
    /// Per-call correlation id, set for backend calls
    pub request_id: Option<String>,
    /// HTTP status returned by the remote service, if any
    pub status_code: Option<u16>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_status_code(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }
}

/// Unified error type for the translation core.
///
/// Configuration errors only come out of settings loading and validation.
/// Everything a single translation call can fail with is one of
/// `RateLimited`, `Backend` or `Cancelled`. `Transport` only comes out of
/// building the HTTP client. `Cache` errors are reported by cache
/// implementations and swallowed by the facade.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Error parsing pages parameter: {0}")]
    PageRange(#[from] PageRangeError),

    #[error("Rate limited after {attempts} attempt(s): {message}{}", format_context(.context))]
    RateLimited {
        attempts: u32,
        message: String,
        context: ErrorContext,
    },

    #[error("Backend error ({class}): {message}{}", format_context(.context))]
    Backend {
        class: BackendErrorClass,
        message: String,
        context: ErrorContext,
    },

    #[error("Cache error: {message}{}", format_context(.context))]
    Cache {
        message: String,
        context: ErrorContext,
    },

    #[error("Cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },

    #[error("HTTP transport setup error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if let Some(status) = ctx.status_code {
        parts.push(format!("status: {}", status));
    }
    if let Some(ref id) = ctx.request_id {
        parts.push(format!("request_id: {}", id));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a backend error of the given class
    pub fn backend_with_context(
        class: BackendErrorClass,
        msg: impl Into<String>,
        context: ErrorContext,
    ) -> Self {
        Error::Backend {
            class,
            message: msg.into(),
            context,
        }
    }

    /// Create a rate-limit error for a single failed attempt
    pub fn rate_limited_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::RateLimited {
            attempts: 1,
            message: msg.into(),
            context,
        }
    }

    /// Create a cache error with structured context
    pub fn cache_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Cache {
            message: msg.into(),
            context,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. })
    }

    /// Backend error class, if this is a classified backend failure.
    pub fn backend_class(&self) -> Option<BackendErrorClass> {
        match self {
            Error::Backend { class, .. } => Some(*class),
            Error::Transport(_) => Some(BackendErrorClass::Network),
            _ => None,
        }
    }

    /// Record the total number of attempts on a rate-limit error.
    ///
    /// Other variants are returned unchanged.
    pub fn with_attempts(self, total: u32) -> Self {
        match self {
            Error::RateLimited {
                message, context, ..
            } => Error::RateLimited {
                attempts: total,
                message,
                context,
            },
            other => other,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::RateLimited { context, .. }
            | Error::Backend { context, .. }
            | Error::Cache { context, .. } => Some(context),
            _ => None,
        }
    }
}
