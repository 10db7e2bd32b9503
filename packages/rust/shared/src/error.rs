//! Error types for docreview.
//!
//! Library crates use [`DocReviewError`] via `thiserror`.
//! App crates (cli) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docreview operations.
#[derive(Debug, thiserror::Error)]
pub enum DocReviewError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Oracle transport or API error (HTTP failure, missing content, etc.).
    #[error("oracle error: {0}")]
    Oracle(String),

    /// Run registry error (unknown run id, etc.).
    #[error("run store error: {0}")]
    Store(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad input, unsupported format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Cooperative cancellation observed at a pipeline checkpoint.
    ///
    /// This is a control signal, not a failure: the run controller maps it
    /// to `RunStatus::Canceled` rather than `Failed`.
    #[error("canceled")]
    Canceled,
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocReviewError>;

impl DocReviewError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is the cooperative cancellation signal.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}
