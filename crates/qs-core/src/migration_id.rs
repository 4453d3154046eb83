//! Strongly-typed migration identifier.

use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;

/// Strongly-typed wrapper for migration ids of the form `NNN_name`.
///
/// The digits before the first underscore are the migration version; the
/// rest is the human-readable name. Ids order by version first, then by
/// their full textual form, so `2_init` sorts before `10_cleanup` even
/// though the plain strings would not.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MigrationId {
    version: u64,
    raw: String,
}

// Hash over the raw text only, keeping lookups through `Borrow<str>` valid.
impl std::hash::Hash for MigrationId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl MigrationId {
    /// Create a new `MigrationId`, panicking if the id is malformed.
    ///
    /// Prefer [`parse`](Self::parse) when handling untrusted input.
    pub fn new(id: impl Into<String>) -> Self {
        match Self::parse(id) {
            Ok(id) => id,
            Err(reason) => panic!("invalid MigrationId: {reason}"),
        }
    }

    /// Parse a `MigrationId`, returning the reason on failure.
    pub fn parse(id: impl Into<String>) -> Result<Self, String> {
        let raw = id.into();
        let Some((digits, name)) = raw.split_once('_') else {
            return Err("expected '<version>_<name>'".to_string());
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err("version prefix must be one or more ASCII digits".to_string());
        }
        let version: u64 = digits
            .parse()
            .map_err(|_| "version prefix does not fit in 64 bits".to_string())?;
        if name.is_empty() {
            return Err("name must not be empty".to_string());
        }
        if !name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            return Err("name may only contain [A-Za-z0-9_]".to_string());
        }
        Ok(Self { version, raw })
    }

    /// The numeric version prefix.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The name portion after the version prefix.
    pub fn name(&self) -> &str {
        match self.raw.split_once('_') {
            Some((_, name)) => name,
            None => &self.raw,
        }
    }

    /// Return the full id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for MigrationId {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl Borrow<str> for MigrationId {
    fn borrow(&self) -> &str {
        &self.raw
    }
}

impl TryFrom<&str> for MigrationId {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MigrationId {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl PartialEq<str> for MigrationId {
    fn eq(&self, other: &str) -> bool {
        self.raw == other
    }
}

impl PartialEq<&str> for MigrationId {
    fn eq(&self, other: &&str) -> bool {
        self.raw == *other
    }
}

impl Serialize for MigrationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for MigrationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let id = MigrationId::parse("001_create_users").unwrap();
        assert_eq!(id.version(), 1);
        assert_eq!(id.name(), "create_users");
        assert_eq!(id.as_str(), "001_create_users");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(MigrationId::parse("create_users").is_err());
        assert!(MigrationId::parse("001").is_err());
        assert!(MigrationId::parse("001_").is_err());
        assert!(MigrationId::parse("_users").is_err());
        assert!(MigrationId::parse("001_bad-name").is_err());
        assert!(MigrationId::parse("001_white space").is_err());
        assert!(MigrationId::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_oversized_version() {
        assert!(MigrationId::parse("99999999999999999999_too_big").is_err());
    }

    #[test]
    fn test_ordering_is_numeric() {
        let two = MigrationId::new("2_second");
        let ten = MigrationId::new("10_tenth");
        // Plain string comparison would put "10..." first.
        assert!(two < ten);
    }

    #[test]
    fn test_ordering_ties_on_text() {
        let a = MigrationId::new("001_alpha");
        let b = MigrationId::new("1_alpha");
        assert_eq!(a.version(), b.version());
        assert!(a < b);
    }

    #[test]
    fn test_display() {
        let id = MigrationId::new("003_add_email");
        assert_eq!(format!("{}", id), "003_add_email");
    }

    #[test]
    fn test_equality_with_str() {
        let id = MigrationId::new("001_create_users");
        assert_eq!(id, "001_create_users");
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = MigrationId::new("001_create_users");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""001_create_users""#);
        let back: MigrationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_deserialize_rejects_malformed() {
        let result: Result<MigrationId, _> = serde_json::from_str(r#""not-an-id""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_borrow_lookup() {
        use std::collections::HashMap;
        let mut map: HashMap<MigrationId, i32> = HashMap::new();
        map.insert(MigrationId::new("001_a"), 1);
        assert_eq!(map.get("001_a"), Some(&1));
    }
}
