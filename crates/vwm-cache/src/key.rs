//! Cache keys, entries and their deterministic storage names.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use vwm_model::{Amount, EntityId, Epoch, Identity};

/// Composite cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheKey {
    /// Payout of one validator in one epoch.
    Withdrawal { entity: EntityId, epoch: Epoch },
    /// Identity registered for a validator.
    Identity { entity: EntityId },
}

impl CacheKey {
    pub fn withdrawal(entity: EntityId, epoch: Epoch) -> Self {
        Self::Withdrawal { entity, epoch }
    }

    pub fn identity(entity: EntityId) -> Self {
        Self::Identity { entity }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::Withdrawal { .. } => "withdrawal",
            Self::Identity { .. } => "identity",
        }
    }

    /// Canonical text form. Fields are length-prefixed so no two keys share it.
    fn canonical(&self) -> String {
        match self {
            Self::Withdrawal { entity, epoch } => {
                let raw = entity.as_str();
                format!("withdrawal:{}:{raw}:{epoch}", raw.len())
            }
            Self::Identity { entity } => {
                let raw = entity.as_str();
                format!("identity:{}:{raw}", raw.len())
            }
        }
    }

    /// File name of this key's record.
    ///
    /// Opaque tokens may contain path separators, so the name is a hash of
    /// the canonical form rather than the token itself.
    #[must_use]
    pub fn storage_name(&self) -> String {
        let digest = Sha256::digest(self.canonical().as_bytes());
        format!("{}-{}.json", self.prefix(), hex::encode(digest))
    }
}

/// Cached value.
///
/// Transport errors have no variant: they are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CacheEntry {
    Amount(Amount),
    Identity(Identity),
    /// The service answered and had nothing (e.g. no registered identity).
    Absent,
}

impl CacheEntry {
    /// Committed entries are closed facts and are never replaced.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Amount(_) | Self::Identity(_))
    }

    #[must_use]
    pub fn amount(&self) -> Option<Amount> {
        match self {
            Self::Amount(amount) => Some(*amount),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_name_is_deterministic() {
        let a = CacheKey::withdrawal(EntityId::new("A"), 6);
        let b = CacheKey::withdrawal(EntityId::new("A"), 6);
        assert_eq!(a.storage_name(), b.storage_name());
        assert!(a.storage_name().starts_with("withdrawal-"));
        assert!(a.storage_name().ends_with(".json"));
    }

    #[test]
    fn test_storage_name_distinguishes_keys() {
        let names = [
            CacheKey::withdrawal(EntityId::new("A"), 6).storage_name(),
            CacheKey::withdrawal(EntityId::new("A"), 7).storage_name(),
            CacheKey::withdrawal(EntityId::new("B"), 6).storage_name(),
            CacheKey::identity(EntityId::new("A")).storage_name(),
            // Would collide with ("A:1", 1) under naive concatenation.
            CacheKey::withdrawal(EntityId::new("A:1"), 1).storage_name(),
            CacheKey::withdrawal(EntityId::new("A"), 11).storage_name(),
        ];
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_storage_name_is_path_safe() {
        let name = CacheKey::withdrawal(EntityId::new("../../etc/passwd"), 1).storage_name();
        assert!(!name.contains('/'));
        assert!(!name.contains(".."));
    }

    #[test]
    fn test_committed() {
        assert!(CacheEntry::Amount(Amount::ZERO).is_committed());
        assert!(CacheEntry::Identity(Identity::new("x")).is_committed());
        assert!(!CacheEntry::Absent.is_committed());
    }
}
