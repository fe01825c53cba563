//! Type-safe event identifier.
//!
//! [`EventId`] is a newtype wrapper around the upstream integer id so that
//! event identifiers cannot be confused with timestamps or counters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stable identity of one tracked match.
///
/// Assigned by the upstream feed and immutable thereafter. Used as the key
/// of [`super::EventTable`], as the target of push updates and as the
/// suffix of per-event channel paths.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    /// Wraps a raw upstream id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EventId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<EventId> for i64 {
    fn from(id: EventId) -> Self {
        id.0
    }
}

impl FromStr for EventId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_is_plain_integer() {
        assert_eq!(EventId::new(42).to_string(), "42");
    }

    #[test]
    fn parses_from_trimmed_string() {
        let Ok(id) = " 17 ".parse::<EventId>() else {
            panic!("valid id");
        };
        assert_eq!(id, EventId::new(17));
        assert!("seventeen".parse::<EventId>().is_err());
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&EventId::new(7)).unwrap_or_default();
        assert_eq!(json, "7");
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(EventId::new(1), "a");
        assert_eq!(map.get(&EventId::new(1)), Some(&"a"));
    }
}
