//! Archived group identity.

use serde::{Deserialize, Serialize};

/// Opaque identifier of an archived conversation (group, channel or chat).
///
/// Telegram exports use signed numeric ids (`-100…` for supergroups) while
/// some archives key groups by username, so the id is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Creates a group id, trimming surrounding whitespace.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.len() == value.len() {
            Self(value)
        } else {
            Self(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GroupId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<i64> for GroupId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl std::str::FromStr for GroupId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_id_trims_input() {
        assert_eq!(GroupId::new("  -1001234 ").as_str(), "-1001234");
        assert_eq!(GroupId::from(-1_001_234_i64), GroupId::from("-1001234"));
    }

    #[test]
    fn test_group_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&GroupId::from("rustlang")).unwrap();
        assert_eq!(json, "\"rustlang\"");
    }
}
