//! Merge reconciliation: one normalized batch into persisted state.
//!
//! Invoked once per source per refresh cycle, serially per source, so two
//! sources never write the same location concurrently. The write policy is
//! upsert-by-id: idempotent under overlapping refresh cycles, with stale
//! leftovers reaped by the date-based cleanup sweep.

use std::collections::HashSet;

use crate::domain::{CanonicalEvent, EventSource};
use crate::error::GatewayError;
use crate::persistence::EventStore;

/// Removes in-batch duplicate IDs, keeping the first occurrence of each.
///
/// Returns the surviving batch and the number of duplicates removed.
#[must_use]
pub fn dedupe_in_source(batch: Vec<CanonicalEvent>) -> (Vec<CanonicalEvent>, usize) {
    let before = batch.len();
    let mut seen = HashSet::with_capacity(before);
    let unique: Vec<CanonicalEvent> = batch.into_iter().filter(|e| seen.insert(e.id)).collect();
    let removed = before - unique.len();
    (unique, removed)
}

/// Reconciles one source's normalized batch against the store for one
/// location.
///
/// Steps: in-source dedupe; cross-source collision check against stored
/// keys (an incoming event whose ID already belongs to a different source
/// or location is dropped, never overwritten); upsert the remainder by
/// `id`. Returns the number of rows written.
///
/// # Errors
///
/// Returns [`GatewayError::PersistenceError`] if the collision query or
/// the upsert fails. The caller isolates this per source: a failure here
/// must not stop the sibling source or the freshness stamp.
pub async fn reconcile_source<S: EventStore>(
    store: &S,
    batch: Vec<CanonicalEvent>,
    source: EventSource,
    location_id: i64,
    location_name: &str,
) -> Result<u64, GatewayError> {
    let (batch, duplicates) = dedupe_in_source(batch);
    if duplicates > 0 {
        tracing::warn!(
            %source,
            location_name,
            duplicates,
            "removed duplicate events within source batch"
        );
    }
    if batch.is_empty() {
        return Ok(0);
    }

    let ids: Vec<i64> = batch.iter().map(|e| e.id).collect();
    let conflicting: HashSet<i64> = store
        .event_keys_for_ids(&ids)
        .await?
        .into_iter()
        .filter(|key| key.source != source || key.location_id != location_id)
        .map(|key| key.id)
        .collect();

    let batch: Vec<CanonicalEvent> = batch
        .into_iter()
        .filter(|e| !conflicting.contains(&e.id))
        .collect();
    if !conflicting.is_empty() {
        tracing::warn!(
            %source,
            location_name,
            collisions = conflicting.len(),
            "dropped events colliding with rows owned by another source or location"
        );
    }
    if batch.is_empty() {
        return Ok(0);
    }

    let written = store.upsert_events(&batch).await?;
    tracing::info!(%source, location_id, location_name, written, "reconciled source batch");
    Ok(written)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::memory::MemoryEventStore;
    use chrono::{NaiveDate, Utc};

    fn event(id: i64, source: EventSource, location_id: i64) -> CanonicalEvent {
        CanonicalEvent {
            id,
            source,
            link: None,
            name: Some(format!("event {id}")),
            ages: None,
            festival_flag: false,
            livestream_flag: false,
            electronic_genre_flag: true,
            other_genre_flag: false,
            date: NaiveDate::from_ymd_opt(2026, 9, 12).unwrap_or_default(),
            start_time: None,
            end_time: None,
            created_date: Utc::now(),
            venue: None,
            artist_list: Vec::new(),
            location_id,
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let mut first = event(42, EventSource::Edmtrain, 5);
        first.name = Some("first".to_string());
        let mut second = event(42, EventSource::Edmtrain, 5);
        second.name = Some("second".to_string());

        let (unique, removed) =
            dedupe_in_source(vec![first, second, event(43, EventSource::Edmtrain, 5)]);
        assert_eq!(removed, 1);
        assert_eq!(unique.len(), 2);
        assert_eq!(
            unique.first().and_then(|e| e.name.as_deref()),
            Some("first")
        );
    }

    #[test]
    fn dedupe_of_clean_batch_removes_nothing() {
        let batch = vec![
            event(1, EventSource::Edmtrain, 5),
            event(2, EventSource::Edmtrain, 5),
        ];
        let (unique, removed) = dedupe_in_source(batch);
        assert_eq!(removed, 0);
        assert_eq!(unique.len(), 2);
    }

    #[tokio::test]
    async fn cross_source_collision_is_dropped_not_clobbered() {
        let store = MemoryEventStore::new();
        let mut existing = event(42, EventSource::Edmtrain, 5);
        existing.name = Some("edmtrain original".to_string());
        store.seed_event(existing);

        let incoming = event(42, EventSource::Ticketmaster, 5);
        let written = reconcile_source(&store, vec![incoming], EventSource::Ticketmaster, 5, "chicago")
            .await;
        assert_eq!(written.ok(), Some(0));

        let Some(stored) = store.event(42) else {
            panic!("original row must survive");
        };
        assert_eq!(stored.source, EventSource::Edmtrain);
        assert_eq!(stored.name.as_deref(), Some("edmtrain original"));
    }

    #[tokio::test]
    async fn cross_location_collision_is_dropped() {
        let store = MemoryEventStore::new();
        store.seed_event(event(42, EventSource::Edmtrain, 9));

        let written =
            reconcile_source(&store, vec![event(42, EventSource::Edmtrain, 5)], EventSource::Edmtrain, 5, "chicago")
                .await;
        assert_eq!(written.ok(), Some(0));
        assert_eq!(store.event(42).map(|e| e.location_id), Some(9));
    }

    #[tokio::test]
    async fn same_source_same_location_upserts() {
        let store = MemoryEventStore::new();
        store.seed_event(event(42, EventSource::Edmtrain, 5));

        let mut updated = event(42, EventSource::Edmtrain, 5);
        updated.name = Some("updated".to_string());
        let written =
            reconcile_source(&store, vec![updated], EventSource::Edmtrain, 5, "chicago").await;
        assert_eq!(written.ok(), Some(1));
        assert_eq!(
            store.event(42).and_then(|e| e.name),
            Some("updated".to_string())
        );
    }

    #[tokio::test]
    async fn empty_after_collision_filter_writes_nothing() {
        let store = MemoryEventStore::new();
        store.seed_event(event(42, EventSource::Edmtrain, 5));

        let written = reconcile_source(
            &store,
            vec![event(42, EventSource::Ticketmaster, 5)],
            EventSource::Ticketmaster,
            5,
            "chicago",
        )
        .await;
        assert_eq!(written.ok(), Some(0));
        assert_eq!(store.event_count(), 1);
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        let store = MemoryEventStore::new();
        store.fail_writes(true);

        let result = reconcile_source(
            &store,
            vec![event(1, EventSource::Edmtrain, 5)],
            EventSource::Edmtrain,
            5,
            "chicago",
        )
        .await;
        assert!(matches!(result, Err(GatewayError::PersistenceError(_))));
    }
}
