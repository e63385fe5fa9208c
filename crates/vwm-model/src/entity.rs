//! Validator and identity tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete accounting period of the remote system.
pub type Epoch = u64;

/// Opaque token identifying a validator (or any other tracked participant).
///
/// Compared by exact match. Duplicates in a request are harmless.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Wrap a raw token. Surrounding whitespace is stripped.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    /// The token as given by the caller.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a newline separated list, skipping blank lines.
    pub fn parse_lines(text: &str) -> Vec<Self> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Self::new)
            .collect()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

/// Platform identity registered for a validator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_trims() {
        assert_eq!(EntityId::new("  abc \n").as_str(), "abc");
    }

    #[test]
    fn test_parse_lines_skips_blank() {
        let ids = EntityId::parse_lines("A\n\n  B  \n\t\nC");
        let raw: Vec<&str> = ids.iter().map(EntityId::as_str).collect();
        assert_eq!(raw, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_entity_id_serializes_as_string() {
        let json = serde_json::to_string(&EntityId::new("A1")).unwrap();
        assert_eq!(json, "\"A1\"");
    }

    #[test]
    fn test_entity_id_deserialize_trims() {
        let id: EntityId = serde_json::from_str("\"  A1 \"").unwrap();
        assert_eq!(id, EntityId::new("A1"));

        let keyed: std::collections::BTreeMap<EntityId, u32> =
            serde_json::from_str(r#"{" A1": 3}"#).unwrap();
        assert_eq!(keyed.get(&EntityId::new("A1")), Some(&3));
    }
}
