//! Time-boxed records for facts that change between runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key of a refreshable record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefreshKey {
    /// Latest epoch reported by the service.
    CurrentEpoch,
    /// Price of one `base` unit in `quote`, e.g. DASH in USD.
    ExchangeRate { base: String, quote: String },
}

impl RefreshKey {
    pub fn exchange_rate(base: &str, quote: &str) -> Self {
        Self::ExchangeRate {
            base: base.to_ascii_lowercase(),
            quote: quote.to_ascii_lowercase(),
        }
    }

    /// File name of this key's record.
    pub(crate) fn storage_name(&self) -> String {
        match self {
            Self::CurrentEpoch => "current_epoch.json".to_string(),
            Self::ExchangeRate { base, quote } => {
                format!("rate-{}-{}.json", sanitize(base), sanitize(quote))
            }
        }
    }
}

fn sanitize(code: &str) -> String {
    code.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// A value with an explicit expiry timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TimedRecord {
    pub value: serde_json::Value,
    pub stored_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TimedRecord {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_rate_names_are_normalized() {
        assert_eq!(
            RefreshKey::exchange_rate("DASH", "USD").storage_name(),
            "rate-dash-usd.json"
        );
        assert_eq!(
            RefreshKey::exchange_rate("da/sh", "u.sd").storage_name(),
            "rate-dash-usd.json"
        );
    }

    #[test]
    fn test_freshness() {
        let now = Utc::now();
        let record = TimedRecord {
            value: serde_json::json!(24),
            stored_at: now,
            expires_at: now + TimeDelta::seconds(60),
        };
        assert!(record.is_fresh_at(now));
        assert!(!record.is_fresh_at(now + TimeDelta::seconds(60)));
    }
}
