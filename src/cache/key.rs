//! Cache fingerprints.
//!
//! A backend describes everything that changes its output as an ordered list of
//! cache-impact parameters. The list is serialized once, at construction; each
//! call only hashes that prefix together with the call mode and the text.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Which backend operation a fingerprint addresses. Translations and free-form
/// prompt outputs never share entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FingerprintMode {
    Translate,
    Llm,
}

impl FingerprintMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FingerprintMode::Translate => "translate",
            FingerprintMode::Llm => "llm_translate",
        }
    }
}

/// Content address of one cached translation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheFingerprint {
    backend: String,
    hash: String,
}

impl CacheFingerprint {
    /// Name of the backend that produced the entry.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Lowercase hex SHA-256.
    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for CacheFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.backend, self.hash)
    }
}

#[derive(Serialize)]
struct StaticPart<'a> {
    backend: &'a str,
    lang_in: &'a str,
    lang_out: &'a str,
    params: &'a [(String, Value)],
}

/// Ordered cache-impact parameters of one backend instance.
///
/// Built from the backend name and language pair, then extended with
/// [`param`](Self::param). Immutable once the backend is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheImpactParams {
    backend: String,
    lang_in: String,
    lang_out: String,
    params: Vec<(String, Value)>,
    serialized: String,
}

impl CacheImpactParams {
    pub fn new(
        backend: impl Into<String>,
        lang_in: impl Into<String>,
        lang_out: impl Into<String>,
    ) -> Self {
        let mut this = Self {
            backend: backend.into(),
            lang_in: lang_in.into(),
            lang_out: lang_out.into(),
            params: Vec::new(),
            serialized: String::new(),
        };
        this.reserialize();
        this
    }

    /// Register a parameter. A name registered twice keeps its first position
    /// and takes the new value.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self.reserialize();
        self
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn lang_in(&self) -> &str {
        &self.lang_in
    }

    pub fn lang_out(&self) -> &str {
        &self.lang_out
    }

    pub fn params(&self) -> &[(String, Value)] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Fingerprint of `text` under `mode`.
    pub fn fingerprint(&self, mode: FingerprintMode, text: &str) -> CacheFingerprint {
        // Compact JSON never contains a raw newline, so the separators are unambiguous.
        let mut hasher = Sha256::new();
        hasher.update(self.serialized.as_bytes());
        hasher.update(b"\n");
        hasher.update(mode.as_str().as_bytes());
        hasher.update(b"\n");
        hasher.update(text.as_bytes());
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        CacheFingerprint {
            backend: self.backend.clone(),
            hash,
        }
    }

    fn reserialize(&mut self) {
        let part = StaticPart {
            backend: &self.backend,
            lang_in: &self.lang_in,
            lang_out: &self.lang_out,
            params: &self.params,
        };
        // Strings and JSON values always serialize.
        self.serialized = serde_json::to_string(&part).unwrap_or_default();
    }
}
