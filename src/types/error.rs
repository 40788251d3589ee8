//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Taxonomy
//!
//! - **Config**: missing credentials/identifiers — fatal, pre-flight
//! - **Transport**: network/backend failure; `permanent` marks the
//!   not-found/auth class that must not be retried
//! - **Parse**: a required section was absent from model output
//! - **Validation**: well-formed but semantically invalid field
//! - **Store**: record store request failed
//!
//! Per-record failures are caught at the pipeline driver boundary and never
//! propagate past it; only `Config` (and a failed initial fetch) terminate
//! the process.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CopycatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Transport error: {message}")]
    Transport { message: String, permanent: bool },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Validation(ValidationError),

    #[error("Store error: {0}")]
    Store(String),
}

impl CopycatError {
    /// Retryable transport failure (timeouts, 5xx, connection resets)
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            permanent: false,
        }
    }

    /// Permanent transport failure (misconfiguration class, never retried)
    pub fn transport_permanent(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            permanent: true,
        }
    }

    /// Classify an HTTP status from a backend into a transport error.
    ///
    /// 400/401/403/404 indicate a misconfigured endpoint, model, or
    /// credential and fail after a single attempt; everything else
    /// (429, 5xx, unknown) is treated as transient.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            permanent: matches!(status, 400 | 401 | 403 | 404),
        }
    }

    /// Whether the gateway may retry this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { permanent: false, .. })
    }
}

impl From<ValidationError> for CopycatError {
    fn from(err: ValidationError) -> Self {
        CopycatError::Validation(err)
    }
}

/// Structured validation error naming the offending field and value
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: &'static str,
    /// What was wrong with it
    pub message: String,
    /// The value as received
    pub actual: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Validation failed for '{}': {} (got {:?})",
            self.field, self.message, self.actual
        )
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            actual: actual.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CopycatError>;
