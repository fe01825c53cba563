//! Tracked match record and the raw snapshot record it is built from.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Coeff, EventId};

/// Match lifecycle as reported by the feed. Optional on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Not started yet.
    Scheduled,
    /// In play.
    Live,
    /// Final whistle.
    Finished,
}

/// Direction of the most recent coefficient change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// No previous coefficient observed yet.
    None,
    /// Coefficient went up.
    Up,
    /// Coefficient went down.
    Down,
    /// Coefficient was re-sent unchanged.
    Flat,
}

/// Raw record returned by the snapshot transport.
///
/// Wire shape: `{id, teamA, teamB, score, coeff, status?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    /// Upstream id.
    pub id: EventId,
    /// Home side display name.
    pub team_a: String,
    /// Away side display name.
    pub team_b: String,
    /// Display score, e.g. `"1:0"`.
    pub score: String,
    /// Current odds.
    pub coeff: Coeff,
    /// Match status, when the feed is configured to send it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
}

/// One tracked match as held in the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Stable identity (table key).
    pub id: EventId,
    /// Home side display name.
    pub team_a: String,
    /// Away side display name.
    pub team_b: String,
    /// Display score. Owned by snapshots; push updates never touch it.
    pub score: String,
    /// Current odds.
    pub coeff: Coeff,
    /// Value of `coeff` immediately before the most recent push update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_coeff: Option<Coeff>,
    /// Match status, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    /// Epoch milliseconds of the most recent mutation from any source.
    pub last_updated: i64,
}

impl Event {
    /// Builds a table record from a snapshot record stamped at `now`.
    ///
    /// `prev_coeff` starts empty; the table carries over an existing trend
    /// when it merges the record.
    #[must_use]
    pub fn from_snapshot(record: ApiEvent, now: i64) -> Self {
        Self {
            id: record.id,
            team_a: record.team_a,
            team_b: record.team_b,
            score: record.score,
            coeff: record.coeff,
            prev_coeff: None,
            status: record.status,
            last_updated: now,
        }
    }

    /// Direction of the last coefficient change.
    #[must_use]
    pub fn trend(&self) -> Trend {
        let Some(prev) = self.prev_coeff else {
            return Trend::None;
        };
        match self.coeff.get().partial_cmp(&prev.get()) {
            Some(std::cmp::Ordering::Greater) => Trend::Up,
            Some(std::cmp::Ordering::Less) => Trend::Down,
            _ => Trend::Flat,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn coeff(v: f64) -> Coeff {
        let Ok(c) = Coeff::new(v) else {
            panic!("finite coefficient");
        };
        c
    }

    #[test]
    fn api_event_decodes_camel_case() {
        let json = r#"{"id":1,"teamA":"Arsenal","teamB":"Chelsea","score":"0:0","coeff":1.85}"#;
        let Ok(record) = serde_json::from_str::<ApiEvent>(json) else {
            panic!("snapshot record should decode");
        };
        assert_eq!(record.id, EventId::new(1));
        assert_eq!(record.team_a, "Arsenal");
        assert_eq!(record.status, None);
    }

    #[test]
    fn api_event_decodes_status() {
        let json = r#"{"id":2,"teamA":"A","teamB":"B","score":"","coeff":2.0,"status":"live"}"#;
        let Ok(record) = serde_json::from_str::<ApiEvent>(json) else {
            panic!("snapshot record should decode");
        };
        assert_eq!(record.status, Some(EventStatus::Live));
    }

    #[test]
    fn from_snapshot_stamps_time() {
        let record = ApiEvent {
            id: EventId::new(3),
            team_a: "A".to_string(),
            team_b: "B".to_string(),
            score: "1:1".to_string(),
            coeff: coeff(3.1),
            status: None,
        };
        let event = Event::from_snapshot(record, 99);
        assert_eq!(event.last_updated, 99);
        assert_eq!(event.prev_coeff, None);
        assert_eq!(event.trend(), Trend::None);
    }

    #[test]
    fn trend_follows_direction() {
        let mut event = Event::from_snapshot(
            ApiEvent {
                id: EventId::new(4),
                team_a: "A".to_string(),
                team_b: "B".to_string(),
                score: String::new(),
                coeff: coeff(2.0),
                status: None,
            },
            0,
        );
        event.prev_coeff = Some(coeff(1.85));
        assert_eq!(event.trend(), Trend::Up);
        event.prev_coeff = Some(coeff(2.5));
        assert_eq!(event.trend(), Trend::Down);
        event.prev_coeff = Some(coeff(2.0));
        assert_eq!(event.trend(), Trend::Flat);
    }
}
