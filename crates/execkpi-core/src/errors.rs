//! Structured error types shared across ExecKPI crates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`KpiError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (column names, counts, table names).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the ExecKPI engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum KpiError {
    /// Malformed or degenerate statistical input (zero totals, bad alpha).
    #[error("invalid input: {0}")]
    InvalidInput(ErrorInfo),
    /// Feature table schema problems (missing target, empty feature set).
    #[error("schema error: {0}")]
    Schema(ErrorInfo),
    /// No candidate classifier could be fitted and scored.
    #[error("training failed: {0}")]
    Training(ErrorInfo),
    /// Upstream feature-table source unreachable or empty.
    #[error("source error: {0}")]
    Source(ErrorInfo),
    /// Artifact store read/write failures, including missing snapshots.
    #[error("artifact error: {0}")]
    Artifact(ErrorInfo),
    /// Serialization and deserialization failures.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Filesystem failures outside the artifact contract.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl KpiError {
    /// Returns the structured payload regardless of the error family.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            KpiError::InvalidInput(info)
            | KpiError::Schema(info)
            | KpiError::Training(info)
            | KpiError::Source(info)
            | KpiError::Artifact(info)
            | KpiError::Serde(info)
            | KpiError::Io(info) => info,
        }
    }

    /// True when the error denotes a missing artifact snapshot.
    pub fn is_not_found(&self) -> bool {
        matches!(self, KpiError::Artifact(info) if info.code == "not-found")
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.context.is_empty() {
            let entries: Vec<String> = self
                .context
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            write!(f, " ({})", entries.join(", "))?;
        }
        Ok(())
    }
}
