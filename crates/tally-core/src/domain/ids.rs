//! Domain identifiers (strongly-typed IDs).
//!
//! Every identifier is a ULID wrapped in `Id<T>`, where `T` is a zero-sized
//! marker type. The marker never exists at runtime; it only keeps a `LineId`
//! from being passed where a `TaskId` is expected.
//!
//! ULIDs sort by creation time, so line ids generated while building a ledger
//! already follow manifest order.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use ulid::Ulid;

/// Marker trait for id kinds. Supplies the display prefix.
pub trait IdMarker: Send + Sync + 'static {
    /// Display prefix, e.g. `"task-"`.
    fn prefix() -> &'static str;
}

/// Generic ULID-backed identifier.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Error returned when a string is not a valid prefixed id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid id '{input}': expected '{prefix}<ulid>'")]
pub struct ParseIdError {
    input: String,
    prefix: &'static str,
}

impl<T: IdMarker> FromStr for Id<T> {
    type Err = ParseIdError;

    /// Accepts both the prefixed display form and a bare ULID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(T::prefix()).unwrap_or(s);
        Ulid::from_string(raw)
            .map(Self::from_ulid)
            .map_err(|_| ParseIdError {
                input: s.to_string(),
                prefix: T::prefix(),
            })
    }
}

impl<T: IdMarker> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T: IdMarker> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ========================================
// Marker types
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn prefix() -> &'static str {
        "task-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Line {}

impl IdMarker for Line {
    fn prefix() -> &'static str {
        "line-"
    }
}

/// Identifier of a live task (one per zone at a time).
pub type TaskId = Id<Task>;

/// Identifier of a line item, unique within its task.
pub type LineId = Id<Line>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_prefix() {
        let task = TaskId::from_ulid(Ulid::new());
        let line = LineId::from_ulid(Ulid::new());

        assert!(task.to_string().starts_with("task-"));
        assert!(line.to_string().starts_with("line-"));
    }

    #[test]
    fn parses_prefixed_and_bare_forms() {
        let ulid = Ulid::new();
        let line = LineId::from_ulid(ulid);

        assert_eq!(line.to_string().parse::<LineId>().unwrap(), line);
        assert_eq!(ulid.to_string().parse::<LineId>().unwrap(), line);
    }

    #[test]
    fn rejects_garbage() {
        let err = "line-not-a-ulid".parse::<LineId>().unwrap_err();
        assert!(err.to_string().contains("line-"));
    }

    #[test]
    fn serializes_as_display_string() {
        let line = LineId::from_ulid(Ulid::new());

        let json = serde_json::to_string(&line).unwrap();
        assert_eq!(json, format!("\"{line}\""));

        let back: LineId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);
    }

    #[test]
    fn phantom_marker_is_free() {
        use std::mem::size_of;

        assert_eq!(size_of::<LineId>(), size_of::<Ulid>());
        assert_eq!(size_of::<TaskId>(), 16);
    }
}
