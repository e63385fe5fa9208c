//! Monitor configuration.
//!
//! Stored as TOML. Every field has a default, so an empty or partial file is
//! valid. The default location is the platform config directory:
//! - Linux: ~/.config/validator-withdrawals-monitor/config.toml
//! - macOS: ~/Library/Application Support/dev.vwm.validator-withdrawals-monitor/config.toml
//! - Windows: %APPDATA%/vwm/validator-withdrawals-monitor/config/config.toml

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use vwm_model::Epoch;
use vwm_source::SourceSettings;

use crate::error::ConfigError;

const APP_QUALIFIER: &str = "dev";
const APP_ORG: &str = "vwm";
const APP_NAME: &str = "validator-withdrawals-monitor";
const CONFIG_FILENAME: &str = "config.toml";

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub source: SourceSettings,
    pub fetch: FetchSettings,
    pub epochs: EpochSettings,
    pub cache: CacheSettings,
}

/// `[fetch]`: load limits against the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Upper bound on simultaneously open remote calls.
    pub max_concurrency: usize,

    /// Minimum spacing between two consecutive call submissions.
    pub min_submit_interval_ms: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 2,
            min_submit_interval_ms: 500,
        }
    }
}

impl FetchSettings {
    /// Effective cap, never below one.
    #[must_use]
    pub fn cap(&self) -> usize {
        self.max_concurrency.max(1)
    }

    #[must_use]
    pub fn min_submit_interval(&self) -> Duration {
        Duration::from_millis(self.min_submit_interval_ms)
    }
}

/// `[epochs]`: range resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpochSettings {
    /// First epoch with withdrawal data; earlier starts are clamped up.
    pub floor: Epoch,

    /// Start used when the caller gives none or an invalid one.
    pub default_start: Epoch,
}

impl Default for EpochSettings {
    fn default() -> Self {
        Self {
            floor: 6,
            default_start: 21,
        }
    }
}

/// `[cache]`: where and how long things are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Cache directory; platform cache dir when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    pub current_epoch_ttl_secs: u64,

    pub exchange_rate_ttl_secs: u64,

    /// How long a "no identity registered" answer is trusted before the
    /// service is asked again.
    pub absent_identity_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            dir: None,
            current_epoch_ttl_secs: 300,
            exchange_rate_ttl_secs: 3600,
            absent_identity_ttl_secs: 3600,
        }
    }
}

impl CacheSettings {
    /// Configured directory, else the platform cache dir, else `~/tmp`.
    #[must_use]
    pub fn resolved_dir(&self) -> PathBuf {
        if let Some(dir) = &self.dir {
            return dir.clone();
        }
        if let Some(dirs) = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME) {
            return dirs.cache_dir().to_path_buf();
        }
        BaseDirs::new()
            .map(|dirs| dirs.home_dir().join("tmp"))
            .unwrap_or_else(|| PathBuf::from("tmp"))
    }

    #[must_use]
    pub fn current_epoch_ttl(&self) -> Duration {
        Duration::from_secs(self.current_epoch_ttl_secs)
    }

    #[must_use]
    pub fn exchange_rate_ttl(&self) -> Duration {
        Duration::from_secs(self.exchange_rate_ttl_secs)
    }

    #[must_use]
    pub fn absent_identity_ttl(&self) -> Duration {
        Duration::from_secs(self.absent_identity_ttl_secs)
    }
}

impl MonitorConfig {
    /// Path of the default configuration file.
    ///
    /// Returns `None` if the platform-specific directory cannot be determined.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
            .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
    }

    /// Load an explicitly named file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load the default file, degrading to defaults on any problem.
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            tracing::warn!("Could not determine config path, using defaults");
            return Self::default();
        };
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("{e}, using defaults");
            Self::default()
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
