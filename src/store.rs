//! Per-day event buckets and their mutations.
//!
//! Mutations never touch storage: each returns the new store and the caller
//! decides when to persist it.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::AgendaResult;
use crate::types::{CalendarDate, DateKey, EditingContext, Event};

/// Mapping from day to its events in insertion order.
///
/// No key maps to an empty bucket and ids are unique within a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EventStore {
    buckets: BTreeMap<DateKey, Vec<Event>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of days holding at least one event.
    pub fn day_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn event_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn contains_key(&self, key: &DateKey) -> bool {
        self.buckets.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &DateKey> {
        self.buckets.keys()
    }

    /// Events on a day, empty if none.
    pub fn lookup(&self, key: &DateKey) -> &[Event] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, key: &DateKey, id: i64) -> Option<&Event> {
        self.lookup(key).iter().find(|e| e.id == id)
    }

    /// Id for a new event: the creation timestamp, bumped past every id in use.
    ///
    /// Once the largest id is `i64::MAX` the lowest unused non-negative id is
    /// taken instead.
    pub fn mint_event_id(&self, now_millis: i64) -> i64 {
        match self.buckets.values().flatten().map(|e| e.id).max() {
            Some(max) if max >= now_millis => max.checked_add(1).unwrap_or_else(|| {
                warn!("event ids exhausted, reusing the lowest free id");
                self.lowest_free_id()
            }),
            _ => now_millis,
        }
    }

    fn lowest_free_id(&self) -> i64 {
        let used: BTreeSet<i64> = self.buckets.values().flatten().map(|e| e.id).collect();
        (0..=i64::MAX).find(|id| !used.contains(id)).unwrap_or(0)
    }

    /// Create an event, or apply an edit, on `selected`.
    ///
    /// Returns `None` without touching anything when any field is missing.
    /// An edit whose date changed leaves its original day, which is dropped
    /// once empty.
    pub fn upsert(
        &self,
        selected: Option<CalendarDate>,
        time: &str,
        description: &str,
        editing: Option<&EditingContext>,
        now_millis: i64,
    ) -> Option<EventStore> {
        let selected = selected?;
        if time.is_empty() || description.is_empty() {
            return None;
        }

        let new_key = DateKey::from_date(selected);
        let mut next = self.clone();

        if let Some(ctx) = editing
            && ctx.original_date != new_key
        {
            next.remove_in_place(&ctx.original_date, ctx.id);
        }

        let event = Event {
            id: editing.map_or_else(|| self.mint_event_id(now_millis), |ctx| ctx.id),
            time: time.to_string(),
            description: description.to_string(),
        };
        debug!(date = %new_key, id = event.id, editing = editing.is_some(), "upserting event");

        let bucket = next.buckets.entry(new_key).or_default();
        bucket.retain(|e| e.id != event.id);
        bucket.push(event);

        Some(next)
    }

    /// Drop one event; the day disappears with its last event.
    pub fn remove(&self, key: &DateKey, id: i64) -> EventStore {
        let mut next = self.clone();
        next.remove_in_place(key, id);
        next
    }

    fn remove_in_place(&mut self, key: &DateKey, id: i64) {
        if let Some(bucket) = self.buckets.get_mut(key) {
            bucket.retain(|e| e.id != id);
            if bucket.is_empty() {
                debug!(date = %key, "pruning empty day");
                self.buckets.remove(key);
            }
        }
    }

    /// Every non-empty day of the month containing `anchor`, in date order.
    pub fn events_in_month(&self, anchor: CalendarDate) -> Vec<(&DateKey, &[Event])> {
        let from = DateKey::from_date(anchor.first_of_month());
        let to = DateKey::from_date(anchor.last_of_month());
        self.buckets
            .range(from..=to)
            .map(|(k, v)| (k, v.as_slice()))
            .collect()
    }

    /// Parse the persisted form, canonicalizing keys.
    ///
    /// Keys that do not name a real day are skipped, as are empty buckets,
    /// days that are not lists and malformed events. Only a document that is
    /// not a JSON object is an error.
    pub fn from_json(raw: &str) -> AgendaResult<Self> {
        let parsed: Map<String, Value> = serde_json::from_str(raw)?;
        let mut store = EventStore::new();
        for (raw_key, bucket) in parsed {
            let Some(key) = DateKey::parse(&raw_key) else {
                warn!(key = %raw_key, "skipping stored events under invalid date key");
                continue;
            };
            let Value::Array(entries) = bucket else {
                warn!(date = %key, "skipping stored day that is not a list");
                continue;
            };
            for entry in entries {
                let event: Event = match serde_json::from_value(entry) {
                    Ok(event) => event,
                    Err(err) => {
                        warn!(date = %key, error = %err, "skipping malformed stored event");
                        continue;
                    }
                };
                let bucket = store.buckets.entry(key.clone()).or_default();
                bucket.retain(|e| e.id != event.id);
                bucket.push(event);
            }
        }
        store.buckets.retain(|_, bucket| !bucket.is_empty());
        Ok(store)
    }

    pub fn to_json(&self) -> AgendaResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Seed an edit of `event` stored under `key`.
///
/// Returns the day the key names and the editing context, or `None` when the
/// key is malformed.
pub fn start_edit(key: &DateKey, event: &Event) -> Option<(CalendarDate, EditingContext)> {
    let date = key.to_date()?;
    Some((
        date,
        EditingContext {
            id: event.id,
            time: event.time.clone(),
            description: event.description.clone(),
            original_date: key.clone(),
        },
    ))
}

