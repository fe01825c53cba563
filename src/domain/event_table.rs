//! Normalized table of events and the rules for folding data into it.
//!
//! [`EventTable`] is plain synchronous state. It knows nothing about
//! transports or locks; [`crate::store::EventStore`] wraps it and decides
//! when each mutation runs.
//!
//! # Invariants
//!
//! - `ids` has no duplicates and every id in it resolves in `entities`.
//! - `entities` holds no id that is absent from `ids` between operations.
//! - `prev_coeff`, when present, is the `coeff` immediately before the last
//!   applied push update.

use std::collections::{HashMap, HashSet};

use super::{ApiEvent, Event, EventId, OddsUpdate};

/// How [`EventTable::apply_update`] treats updates stamped earlier than the
/// record they target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateOrdering {
    /// Last message wins by arrival order; `at` is not compared.
    #[default]
    ArrivalOrder,
    /// Drop an update whose `at` is strictly older than `last_updated`.
    Timestamp,
}

impl std::str::FromStr for UpdateOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arrival" | "arrival_order" => Ok(Self::ArrivalOrder),
            "timestamp" => Ok(Self::Timestamp),
            other => Err(format!("unknown update ordering: {other}")),
        }
    }
}

/// What [`EventTable::apply_update`] did with an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record was rewritten.
    Applied,
    /// No record with that id; the update was dropped.
    UnknownEvent,
    /// Timestamp ordering is on and the update was older than the record.
    Stale,
}

/// Read-only view of the table's status flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStatus {
    /// A snapshot fetch is in flight.
    pub loading: bool,
    /// Message from the last failed fetch.
    pub error: Option<String>,
    /// The push channel is open.
    pub live_connected: bool,
    /// Epoch milliseconds of the last successful snapshot merge.
    pub last_snapshot_at: Option<i64>,
    /// Number of events in list order.
    pub event_count: usize,
}

/// The store's state: entities, their display order, and status flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    entities: HashMap<EventId, Event>,
    ids: Vec<EventId>,
    /// True only while a snapshot fetch is in flight.
    pub loading: bool,
    /// Set when the last fetch failed; cleared when a new fetch starts.
    pub error: Option<String>,
    /// True iff the push channel is currently open.
    pub live_connected: bool,
    /// Timestamp of the last successful snapshot merge.
    pub last_snapshot_at: Option<i64>,
}

impl EventTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the table contents with a snapshot taken at `now`.
    ///
    /// Records for ids already present keep their `prev_coeff`, so a trend
    /// set by a live update that raced ahead of the fetch survives. `ids`
    /// becomes the snapshot order; ids missing from the snapshot are
    /// dropped. A duplicated id keeps its first position and its last
    /// record.
    pub fn merge_snapshot(&mut self, records: Vec<ApiEvent>, now: i64) {
        let mut next_entities = HashMap::with_capacity(records.len());
        let mut next_ids = Vec::with_capacity(records.len());

        for record in records {
            let mut event = Event::from_snapshot(record, now);
            if let Some(current) = self.entities.get(&event.id) {
                event.prev_coeff = current.prev_coeff;
            }
            let id = event.id;
            if next_entities.insert(id, event).is_none() {
                next_ids.push(id);
            }
        }

        self.entities = next_entities;
        self.ids = next_ids;
        self.last_snapshot_at = Some(now);
    }

    /// Inserts or shallow-merges events.
    ///
    /// Optional fields that are `None` on the input keep the existing
    /// record's value; every other field is overwritten. New ids are
    /// appended to `ids`; existing ids keep their position.
    pub fn upsert_many<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = Event>,
    {
        for mut event in events {
            let id = event.id;
            match self.entities.get(&id) {
                Some(current) => {
                    event.prev_coeff = event.prev_coeff.or(current.prev_coeff);
                    event.status = event.status.or(current.status);
                }
                None => self.ids.push(id),
            }
            self.entities.insert(id, event);
        }
    }

    /// Folds one push update into its record.
    ///
    /// Shifts the current `coeff` into `prev_coeff` and stamps the record
    /// with `update.at`. Applying the same update twice shifts twice.
    pub fn apply_update(&mut self, update: OddsUpdate, ordering: UpdateOrdering) -> UpdateOutcome {
        let Some(target) = self.entities.get_mut(&update.id) else {
            return UpdateOutcome::UnknownEvent;
        };
        if ordering == UpdateOrdering::Timestamp && update.at < target.last_updated {
            return UpdateOutcome::Stale;
        }
        target.prev_coeff = Some(target.coeff);
        target.coeff = update.coeff;
        target.last_updated = update.at;
        UpdateOutcome::Applied
    }

    /// Events in display order. Ids that fail to resolve are skipped.
    pub fn list(&self) -> impl Iterator<Item = &Event> {
        self.ids.iter().filter_map(|id| self.entities.get(id))
    }

    /// Direct lookup.
    #[must_use]
    pub fn by_id(&self, id: EventId) -> Option<&Event> {
        self.entities.get(&id)
    }

    /// Display order.
    #[must_use]
    pub fn ids(&self) -> &[EventId] {
        &self.ids
    }

    /// Number of events in display order.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the table holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Snapshot of the status flags.
    #[must_use]
    pub fn status(&self) -> TableStatus {
        TableStatus {
            loading: self.loading,
            error: self.error.clone(),
            live_connected: self.live_connected,
            last_snapshot_at: self.last_snapshot_at,
            event_count: self.ids.len(),
        }
    }

    /// Checks the `ids`/`entities` invariants.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let unique: HashSet<_> = self.ids.iter().collect();
        unique.len() == self.ids.len()
            && self.entities.len() == self.ids.len()
            && self.ids.iter().all(|id| self.entities.contains_key(id))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Coeff, EventStatus};

    fn coeff(v: f64) -> Coeff {
        let Ok(c) = Coeff::new(v) else {
            panic!("finite coefficient");
        };
        c
    }

    fn record(id: i64, c: f64) -> ApiEvent {
        ApiEvent {
            id: EventId::new(id),
            team_a: format!("Home {id}"),
            team_b: format!("Away {id}"),
            score: "0:0".to_string(),
            coeff: coeff(c),
            status: None,
        }
    }

    fn update(id: i64, c: f64, at: i64) -> OddsUpdate {
        OddsUpdate {
            id: EventId::new(id),
            coeff: coeff(c),
            at,
        }
    }

    fn get(table: &EventTable, id: i64) -> Event {
        let Some(event) = table.by_id(EventId::new(id)) else {
            panic!("event {id} should exist");
        };
        event.clone()
    }

    #[test]
    fn snapshot_sets_order_and_timestamp() {
        let mut table = EventTable::new();
        table.merge_snapshot(vec![record(3, 1.5), record(1, 2.0), record(2, 3.0)], 100);

        let order: Vec<i64> = table.list().map(|e| e.id.get()).collect();
        assert_eq!(order, vec![3, 1, 2]);
        assert_eq!(table.last_snapshot_at, Some(100));
        assert_eq!(get(&table, 1).last_updated, 100);
        assert!(table.is_consistent());
    }

    #[test]
    fn snapshot_is_idempotent() {
        let mut once = EventTable::new();
        once.merge_snapshot(vec![record(1, 1.5), record(2, 2.0)], 100);

        let mut twice = EventTable::new();
        twice.merge_snapshot(vec![record(1, 1.5), record(2, 2.0)], 100);
        twice.merge_snapshot(vec![record(1, 1.5), record(2, 2.0)], 100);

        assert_eq!(once, twice);
    }

    #[test]
    fn snapshot_replaces_order_and_drops_missing() {
        let mut table = EventTable::new();
        table.merge_snapshot(vec![record(1, 1.5), record(2, 2.0)], 100);
        table.merge_snapshot(vec![record(2, 2.1), record(4, 4.0)], 200);

        let order: Vec<i64> = table.list().map(|e| e.id.get()).collect();
        assert_eq!(order, vec![2, 4]);
        assert!(table.by_id(EventId::new(1)).is_none());
        assert!(table.is_consistent());
    }

    #[test]
    fn snapshot_with_duplicate_ids_keeps_first_position_last_record() {
        let mut table = EventTable::new();
        table.merge_snapshot(vec![record(1, 1.5), record(2, 2.0), record(1, 9.0)], 100);

        assert_eq!(table.ids(), &[EventId::new(1), EventId::new(2)]);
        assert_eq!(get(&table, 1).coeff, coeff(9.0));
        assert!(table.is_consistent());
    }

    #[test]
    fn trend_derivation() {
        let mut table = EventTable::new();
        table.merge_snapshot(vec![record(1, 1.85)], 0);

        let outcome = table.apply_update(update(1, 2.00, 10), UpdateOrdering::ArrivalOrder);
        assert_eq!(outcome, UpdateOutcome::Applied);
        let event = get(&table, 1);
        assert_eq!(event.prev_coeff, Some(coeff(1.85)));
        assert_eq!(event.coeff, coeff(2.00));
        assert_eq!(event.last_updated, 10);

        table.apply_update(update(1, 1.90, 11), UpdateOrdering::ArrivalOrder);
        let event = get(&table, 1);
        assert_eq!(event.prev_coeff, Some(coeff(2.00)));
        assert_eq!(event.coeff, coeff(1.90));
    }

    #[test]
    fn update_leaves_score_and_teams_alone() {
        let mut table = EventTable::new();
        table.merge_snapshot(vec![record(1, 1.85)], 0);
        table.apply_update(update(1, 2.0, 5), UpdateOrdering::ArrivalOrder);

        let event = get(&table, 1);
        assert_eq!(event.score, "0:0");
        assert_eq!(event.team_a, "Home 1");
    }

    #[test]
    fn unknown_id_update_is_noop() {
        let mut table = EventTable::new();
        table.merge_snapshot(vec![record(1, 1.85)], 0);
        let before = table.clone();

        let outcome = table.apply_update(update(99, 2.0, 5), UpdateOrdering::ArrivalOrder);
        assert_eq!(outcome, UpdateOutcome::UnknownEvent);
        assert_eq!(table, before);
    }

    #[test]
    fn snapshot_preserves_live_trend() {
        let mut table = EventTable::new();
        table.merge_snapshot(vec![record(1, 1.85)], 0);
        table.apply_update(update(1, 2.00, 5), UpdateOrdering::ArrivalOrder);

        table.merge_snapshot(vec![record(1, 2.00)], 10);
        let event = get(&table, 1);
        assert_eq!(event.prev_coeff, Some(coeff(1.85)));
        assert_eq!(event.coeff, coeff(2.00));
        assert_eq!(event.last_updated, 10);
    }

    #[test]
    fn ordering_u1_then_u2() {
        let mut table = EventTable::new();
        table.merge_snapshot(vec![record(1, 1.5)], 0);
        table.apply_update(update(1, 1.6, 7), UpdateOrdering::ArrivalOrder);
        table.apply_update(update(1, 1.7, 7), UpdateOrdering::ArrivalOrder);

        let event = get(&table, 1);
        assert_eq!(event.coeff, coeff(1.7));
        assert_eq!(event.prev_coeff, Some(coeff(1.6)));
    }

    #[test]
    fn replayed_update_collapses_trend() {
        let mut table = EventTable::new();
        table.merge_snapshot(vec![record(1, 1.5)], 0);
        let u = update(1, 2.0, 3);
        table.apply_update(u, UpdateOrdering::ArrivalOrder);
        table.apply_update(u, UpdateOrdering::ArrivalOrder);

        let event = get(&table, 1);
        assert_eq!(event.prev_coeff, Some(coeff(2.0)));
        assert_eq!(event.coeff, coeff(2.0));
    }

    #[test]
    fn arrival_order_accepts_older_timestamp() {
        let mut table = EventTable::new();
        table.merge_snapshot(vec![record(1, 1.5)], 100);
        let outcome = table.apply_update(update(1, 1.4, 50), UpdateOrdering::ArrivalOrder);
        assert_eq!(outcome, UpdateOutcome::Applied);
        assert_eq!(get(&table, 1).last_updated, 50);
    }

    #[test]
    fn timestamp_ordering_rejects_older_update() {
        let mut table = EventTable::new();
        table.merge_snapshot(vec![record(1, 1.5)], 100);
        let before = table.clone();

        let outcome = table.apply_update(update(1, 1.4, 50), UpdateOrdering::Timestamp);
        assert_eq!(outcome, UpdateOutcome::Stale);
        assert_eq!(table, before);

        let outcome = table.apply_update(update(1, 1.6, 100), UpdateOrdering::Timestamp);
        assert_eq!(outcome, UpdateOutcome::Applied);
    }

    #[test]
    fn upsert_appends_new_and_keeps_order() {
        let mut table = EventTable::new();
        table.merge_snapshot(vec![record(2, 2.0), record(1, 1.0)], 0);

        let fresh = Event::from_snapshot(record(5, 5.0), 1);
        let refreshed = Event::from_snapshot(record(1, 1.1), 1);
        table.upsert_many([fresh, refreshed]);

        assert_eq!(
            table.ids(),
            &[EventId::new(2), EventId::new(1), EventId::new(5)]
        );
        assert_eq!(get(&table, 1).coeff, coeff(1.1));
        assert!(table.is_consistent());
    }

    #[test]
    fn upsert_preserves_absent_optional_fields() {
        let mut table = EventTable::new();
        let mut seeded = Event::from_snapshot(record(1, 1.85), 0);
        seeded.status = Some(EventStatus::Live);
        table.upsert_many([seeded]);
        table.apply_update(update(1, 2.0, 1), UpdateOrdering::ArrivalOrder);

        let mut patch = Event::from_snapshot(record(1, 2.0), 2);
        patch.score = "1:0".to_string();
        table.upsert_many([patch]);

        let event = get(&table, 1);
        assert_eq!(event.prev_coeff, Some(coeff(1.85)));
        assert_eq!(event.status, Some(EventStatus::Live));
        assert_eq!(event.score, "1:0");
    }

    #[test]
    fn upsert_with_repeated_id_in_one_batch() {
        let mut table = EventTable::new();
        table.upsert_many([
            Event::from_snapshot(record(1, 1.0), 0),
            Event::from_snapshot(record(1, 1.2), 0),
        ]);
        assert_eq!(table.ids(), &[EventId::new(1)]);
        assert_eq!(get(&table, 1).coeff, coeff(1.2));
    }

    #[test]
    fn status_reflects_flags() {
        let mut table = EventTable::new();
        table.merge_snapshot(vec![record(1, 1.0)], 42);
        table.live_connected = true;
        let status = table.status();
        assert_eq!(status.event_count, 1);
        assert_eq!(status.last_snapshot_at, Some(42));
        assert!(status.live_connected);
        assert!(!status.loading);
    }

    #[test]
    fn ordering_parses_from_config_strings() {
        assert_eq!(
            "arrival".parse::<UpdateOrdering>(),
            Ok(UpdateOrdering::ArrivalOrder)
        );
        assert_eq!(
            "Timestamp".parse::<UpdateOrdering>(),
            Ok(UpdateOrdering::Timestamp)
        );
        assert!("newest".parse::<UpdateOrdering>().is_err());
    }
}
