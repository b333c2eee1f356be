//! Chat-completion transport.
//!
//! Backends talk to the remote model through [`ChatTransport`], which keeps
//! the HTTP details (and the mapping from HTTP failures to [`crate::Error`])
//! out of the retry and prompting logic.

pub mod http;

pub use http::{HttpChatTransport, TransportError};

use crate::tokens::TokenUsage;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Successful completion. `content` is `None` when the service returned no text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub usage: TokenUsage,
}

/// One request, one response. Implementations must not retry.
///
/// Failures are classified: `Error::RateLimited` for transient throttling,
/// `Error::Backend` for everything else, connection failures included.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, request: &ChatRequest, request_id: &str) -> Result<ChatCompletion>;

    /// Service root the transport talks to, for logs.
    fn endpoint(&self) -> &str;
}
