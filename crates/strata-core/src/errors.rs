//! Structured error types shared across Strata crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`StrataError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable kebab-case code, matched on by callers and tests.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Key value context (cluster ids, counts, stage names).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a payload from a stable code and a diagnostic message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Attaches a context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the Strata engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum StrataError {
    /// Graph storage and structural errors.
    #[error("graph error: {0}")]
    Graph(ErrorInfo),
    /// Leaf graph generation errors.
    #[error("generate error: {0}")]
    Generate(ErrorInfo),
    /// Inter-cluster connection sampling errors.
    #[error("sample error: {0}")]
    Sample(ErrorInfo),
    /// Hierarchy definition and build errors.
    #[error("build error: {0}")]
    Build(ErrorInfo),
    /// Layout orchestration errors.
    #[error("layout error: {0}")]
    Layout(ErrorInfo),
    /// Measure evaluation errors.
    #[error("measure error: {0}")]
    Measure(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// A cooperative cancellation point observed a cancelled token.
    #[error("cancelled: {0}")]
    Cancelled(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl StrataError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            StrataError::Graph(info)
            | StrataError::Generate(info)
            | StrataError::Sample(info)
            | StrataError::Build(info)
            | StrataError::Layout(info)
            | StrataError::Measure(info)
            | StrataError::Serde(info)
            | StrataError::Cancelled(info) => info,
        }
    }

    /// Returns true when the error represents a cooperative cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StrataError::Cancelled(_))
    }
}
