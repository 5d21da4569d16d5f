//! In-memory [`EventStore`] used by service-layer tests.
//!
//! Backed by a plain `Mutex` over maps; supports injecting read and write
//! failures so fail-open/fail-closed paths can be exercised without a
//! database.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::models::{EventKey, FreshnessRecord};
use super::EventStore;
use crate::domain::{CanonicalEvent, EventSource};
use crate::error::GatewayError;

/// Test double for the persistence layer.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    inner: Mutex<Inner>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

#[derive(Debug, Default)]
struct Inner {
    events: HashMap<i64, CanonicalEvent>,
    freshness: HashMap<i64, FreshnessRecord>,
}

impl MemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every read operation fail with a persistence error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every write operation fail with a persistence error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seeds an event row directly, bypassing reconciliation.
    pub fn seed_event(&self, event: CanonicalEvent) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.events.insert(event.id, event);
        }
    }

    /// Returns a stored event by ID.
    #[must_use]
    pub fn event(&self, id: i64) -> Option<CanonicalEvent> {
        self.inner.lock().ok().and_then(|i| i.events.get(&id).cloned())
    }

    /// Returns the number of stored event rows.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.inner.lock().map(|i| i.events.len()).unwrap_or(0)
    }

    /// Returns the freshness record for a location without error injection.
    #[must_use]
    pub fn freshness(&self, location_id: i64) -> Option<FreshnessRecord> {
        self.inner
            .lock()
            .ok()
            .and_then(|i| i.freshness.get(&location_id).cloned())
    }

    fn read_guard(&self) -> Result<std::sync::MutexGuard<'_, Inner>, GatewayError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(GatewayError::PersistenceError(
                "injected read failure".to_string(),
            ));
        }
        self.inner
            .lock()
            .map_err(|_| GatewayError::PersistenceError("poisoned lock".to_string()))
    }

    fn write_guard(&self) -> Result<std::sync::MutexGuard<'_, Inner>, GatewayError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GatewayError::PersistenceError(
                "injected write failure".to_string(),
            ));
        }
        self.inner
            .lock()
            .map_err(|_| GatewayError::PersistenceError("poisoned lock".to_string()))
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn events_for_location(
        &self,
        location_id: i64,
    ) -> Result<Vec<CanonicalEvent>, GatewayError> {
        let inner = self.read_guard()?;
        let mut events: Vec<CanonicalEvent> = inner
            .events
            .values()
            .filter(|e| e.location_id == location_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    async fn event_keys_for_ids(&self, ids: &[i64]) -> Result<Vec<EventKey>, GatewayError> {
        let inner = self.read_guard()?;
        Ok(ids
            .iter()
            .filter_map(|id| inner.events.get(id))
            .map(|e| EventKey {
                id: e.id,
                source: e.source,
                location_id: e.location_id,
            })
            .collect())
    }

    async fn upsert_events(&self, events: &[CanonicalEvent]) -> Result<u64, GatewayError> {
        let mut inner = self.write_guard()?;
        for event in events {
            inner.events.insert(event.id, event.clone());
        }
        Ok(events.len() as u64)
    }

    async fn delete_events_by_source(
        &self,
        location_id: i64,
        source: EventSource,
    ) -> Result<u64, GatewayError> {
        let mut inner = self.write_guard()?;
        let before = inner.events.len();
        inner
            .events
            .retain(|_, e| !(e.location_id == location_id && e.source == source));
        Ok((before - inner.events.len()) as u64)
    }

    async fn delete_past_events(&self, cutoff: NaiveDate) -> Result<u64, GatewayError> {
        let mut inner = self.write_guard()?;
        let before = inner.events.len();
        inner.events.retain(|_, e| e.date >= cutoff);
        Ok((before - inner.events.len()) as u64)
    }

    async fn freshness_for_location(
        &self,
        location_id: i64,
    ) -> Result<Option<FreshnessRecord>, GatewayError> {
        let inner = self.read_guard()?;
        Ok(inner.freshness.get(&location_id).cloned())
    }

    async fn insert_freshness(&self, record: &FreshnessRecord) -> Result<(), GatewayError> {
        let mut inner = self.write_guard()?;
        inner
            .freshness
            .entry(record.location_id)
            .or_insert_with(|| record.clone());
        Ok(())
    }

    async fn upsert_freshness(&self, record: &FreshnessRecord) -> Result<(), GatewayError> {
        let mut inner = self.write_guard()?;
        inner.freshness.insert(record.location_id, record.clone());
        Ok(())
    }
}
