//! Error types for TubeSieve.
//!
//! Library crates use [`TubeSieveError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all TubeSieve operations.
#[derive(Debug, thiserror::Error)]
pub enum TubeSieveError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Document or rule file could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A single rule pattern failed to compile.
    #[error("invalid pattern /{pattern}/{flags}: {message}")]
    Pattern {
        pattern: String,
        flags: String,
        message: String,
    },

    /// A custom predicate failed to compile or evaluate.
    #[error("custom predicate error: {0}")]
    Predicate(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (wrong shape, out-of-range value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TubeSieveError>;

impl TubeSieveError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a pattern error for the given `(pattern, flags)` pair.
    pub fn pattern(
        pattern: impl Into<String>,
        flags: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            flags: flags.into(),
            message: msg.into(),
        }
    }

    /// Create a custom predicate error.
    pub fn predicate(msg: impl Into<String>) -> Self {
        Self::Predicate(msg.into())
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
}
