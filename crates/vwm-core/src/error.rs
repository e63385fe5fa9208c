//! Error types for the core crate.
//!
//! Per-pair fetch failures are values ([`vwm_model::Outcome::Failed`]), not
//! errors; only configuration and setup can fail outright.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Setup error for the withdrawal service.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to set up the data source")]
    Source(#[from] vwm_source::SourceError),
}

/// Result type alias for core setup.
pub type Result<T> = std::result::Result<T, CoreError>;
