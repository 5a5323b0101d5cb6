//! Error types for life_trace.
//!
//! Structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for hosts that retry
//!
//! Numerical degeneracy inside the analysis is never an error: non-finite
//! values clamp to zero and the run continues, and insufficient data yields
//! a well-formed result rather than a failure.
//!
//! # Host-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 11,
//!   "category": "input",
//!   "message": "invalid events payload: expected an array",
//!   "recoverable": true
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for life_trace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad or malformed input (events, options).
    Input,
    /// The host cancelled the run.
    Cancelled,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Cancelled => write!(f, "cancelled"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for life_trace.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("invalid events payload: {0}")]
    InvalidEvents(String),

    // Cancellation (50-59)
    #[error("analysis cancelled by host")]
    Cancelled,

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the stable error code for this error type.
    ///
    /// Codes are grouped by category:
    /// - 10-19: Input errors
    /// - 50-59: Cancellation
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidOptions(_) => 10,
            Error::InvalidEvents(_) => 11,
            Error::Cancelled => 50,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidOptions(_) | Error::InvalidEvents(_) => ErrorCategory::Input,
            Error::Cancelled => ErrorCategory::Cancelled,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Recoverable errors may be resolved by fixing the input and re-running.
    /// A cancellation is not an error to recover from: the host asked for it.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::InvalidOptions(_) => true,
            Error::InvalidEvents(_) => true,
            Error::Cancelled => false,
            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }
}

/// Structured error response for JSON output.
///
/// Used by host/agent integrations for machine-parseable error reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., file path, option name).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context: HashMap::new(),
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(Error::InvalidOptions("test".into()).code(), 10);
        assert_eq!(Error::InvalidEvents("test".into()).code(), 11);
        assert_eq!(Error::Cancelled.code(), 50);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            Error::InvalidEvents("test".into()).category(),
            ErrorCategory::Input
        );
        assert_eq!(Error::Cancelled.category(), ErrorCategory::Cancelled);
        assert_eq!(
            Error::Json(serde_json::from_str::<u32>("x").unwrap_err()).category(),
            ErrorCategory::Io
        );
    }

    #[test]
    fn test_error_recoverable() {
        assert!(Error::InvalidOptions("test".into()).is_recoverable());
        assert!(Error::InvalidEvents("test".into()).is_recoverable());
        assert!(!Error::Cancelled.is_recoverable());
    }

    #[test]
    fn test_structured_error_json() {
        let err = Error::InvalidEvents("expected an array".into());
        let structured = StructuredError::from(&err).with_context("input", "events.json");
        let json = structured.to_json();

        assert!(json.contains(r#""code":11"#));
        assert!(json.contains(r#""category":"input""#));
        assert!(json.contains(r#""recoverable":true"#));
        assert!(json.contains(r#""input":"events.json""#));
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Input.to_string(), "input");
        assert_eq!(ErrorCategory::Cancelled.to_string(), "cancelled");
        assert_eq!(ErrorCategory::Io.to_string(), "io");
    }
}
