//! Cache error types.
//!
//! Cache failures never abort a fetch run; callers log them and continue
//! with the in-memory state.

use std::path::PathBuf;
use thiserror::Error;

/// Cache operation error.
#[derive(Debug, Error)]
pub enum CacheError {
    /// File I/O error.
    #[error("Failed to {operation} cache file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Failed to serialize cache record")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to commit cache record to {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CacheError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {} the cache file at {}", operation, path.display()),
            Self::Serialization { .. } => {
                "An error occurred while encoding a cache record.".to_string()
            }
            Self::AtomicWriteFailed { target_path, .. } => format!(
                "Could not save the cache record to {}.",
                target_path.display()
            ),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { .. } | Self::AtomicWriteFailed { .. } => Some(
                "Check disk space and that the cache directory is writable. \
                 Results stay valid for this run but will be fetched again next time."
                    .into(),
            ),
            Self::Serialization { .. } => None,
        }
    }
}

/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
