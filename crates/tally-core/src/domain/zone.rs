//! Zone keys.
//!
//! A zone is one counterparty or workflow partition (a 3PL channel, an
//! outbound bench) with at most one live task. Devices type zone names
//! loosely, so every entry point canonicalises before looking a zone up:
//! the same physical zone must never end up with two tasks because one
//! device sent "Hello Bear" and another "hellobear".

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::TallyError;

/// Canonical zone name (one counterparty/workflow partition).
///
/// Clients address zones by display name ("Hello Bear"); the key is the
/// lower-cased name with all whitespace removed ("hellobear").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZoneKey(String);

impl ZoneKey {
    pub fn parse(raw: &str) -> Result<Self, TallyError> {
        let key: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        if key.is_empty() {
            return Err(TallyError::UnknownZone(raw.to_string()));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for ZoneKey {
    type Error = TallyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ZoneKey> for String {
    fn from(key: ZoneKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("anymall", "anymall")]
    #[case::spaced("Hello Bear", "hellobear")]
    #[case::padded("  Yummy\t", "yummy")]
    #[case::upper("HOMEY", "homey")]
    fn parse_canonicalises(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(ZoneKey::parse(raw).unwrap().as_str(), expected);
    }

    #[test]
    fn blank_zone_is_rejected() {
        assert!(matches!(
            ZoneKey::parse("   "),
            Err(TallyError::UnknownZone(_))
        ));
    }

    #[test]
    fn deserialising_goes_through_parse() {
        let key: ZoneKey = serde_json::from_str("\"Hello Bear\"").unwrap();
        assert_eq!(key.as_str(), "hellobear");
    }
}
