//! Connection settings for the remote services.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default platform explorer API.
pub const DEFAULT_BASE_URL: &str = "https://platform-explorer.pshenmic.dev";

/// Default DASH/USD ticker (plain-text decimal body).
pub const DEFAULT_RATE_URL: &str = "https://chainz.cryptoid.info/dash/api.dws?q=ticker.usd";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// `[source]` section of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Base URL of the explorer API serving identities, withdrawals and status.
    pub base_url: String,

    /// URL of the exchange-rate ticker.
    pub rate_url: String,

    /// Time budget of a single call, in seconds.
    pub timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_url: DEFAULT_RATE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SourceSettings {
    /// Per-call timeout. Zero is raised to one second.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
