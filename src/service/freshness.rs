//! Per-location TTL state: staleness checks and refresh stamping.
//!
//! The tracker exclusively owns freshness records. Read-side errors fail
//! open (a location is never stuck unrefreshable because the check
//! errored); write-side errors propagate so a failed stamp is visible to
//! the refresh cycle that attempted it.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::error::GatewayError;
use crate::persistence::{EventStore, FreshnessRecord};

/// Returns `true` when a refresh is due at `now` for the given record.
#[must_use]
pub fn is_due(record: &FreshnessRecord, now: DateTime<Utc>) -> bool {
    now >= record.next_update
}

/// Cache freshness tracker over the freshness table.
#[derive(Debug)]
pub struct FreshnessTracker<S> {
    store: Arc<S>,
    ttl: Duration,
}

impl<S> Clone for FreshnessTracker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ttl: self.ttl,
        }
    }
}

impl<S: EventStore> FreshnessTracker<S> {
    /// Creates a tracker with the given TTL in hours.
    #[must_use]
    pub fn new(store: Arc<S>, ttl_hours: i64) -> Self {
        Self {
            store,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Returns `true` iff the location's cached events are due a refresh.
    ///
    /// Lazily creates a freshness record with `next_update = now` when none
    /// exists, so a first-seen location refreshes exactly once immediately.
    /// Fails open: any store read error is logged and treated as stale, so
    /// staleness is never under-detected.
    pub async fn needs_refresh(&self, location_id: i64) -> bool {
        let record = match self.store.freshness_for_location(location_id).await {
            Ok(record) => record,
            Err(error) => {
                tracing::warn!(location_id, %error, "freshness check failed, assuming stale");
                return true;
            }
        };

        match record {
            Some(record) => is_due(&record, Utc::now()),
            None => {
                let now = Utc::now();
                let bootstrap = FreshnessRecord {
                    location_id,
                    last_update: now,
                    next_update: now,
                };
                if let Err(error) = self.store.insert_freshness(&bootstrap).await {
                    tracing::warn!(location_id, %error, "freshness bootstrap insert failed");
                }
                true
            }
        }
    }

    /// Stamps a completed refresh cycle: `last_update = now`,
    /// `next_update = now + TTL`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on store failure; a
    /// silently missed stamp would mask a real consistency problem, so this
    /// path does not fail open.
    pub async fn mark_refreshed(&self, location_id: i64) -> Result<(), GatewayError> {
        let now = Utc::now();
        let record = FreshnessRecord {
            location_id,
            last_update: now,
            next_update: now + self.ttl,
        };
        self.store.upsert_freshness(&record).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::memory::MemoryEventStore;

    #[tokio::test]
    async fn unseen_location_is_stale_and_bootstraps_one_record() {
        let store = Arc::new(MemoryEventStore::new());
        let tracker = FreshnessTracker::new(Arc::clone(&store), 12);

        assert!(tracker.needs_refresh(71).await);

        let Some(record) = store.freshness(71) else {
            panic!("expected bootstrap record");
        };
        assert!(record.next_update <= Utc::now());

        // A second check before any refresh completes still reports stale
        // and keeps the original record.
        assert!(tracker.needs_refresh(71).await);
        assert_eq!(store.freshness(71), Some(record));
    }

    #[tokio::test]
    async fn stamp_then_check_reports_fresh() {
        let store = Arc::new(MemoryEventStore::new());
        let tracker = FreshnessTracker::new(Arc::clone(&store), 12);

        let result = tracker.mark_refreshed(71).await;
        assert!(result.is_ok());
        assert!(!tracker.needs_refresh(71).await);
    }

    #[tokio::test]
    async fn stamp_sets_next_update_ttl_ahead() {
        let store = Arc::new(MemoryEventStore::new());
        let tracker = FreshnessTracker::new(Arc::clone(&store), 6);

        let result = tracker.mark_refreshed(71).await;
        assert!(result.is_ok());
        let Some(record) = store.freshness(71) else {
            panic!("expected stamped record");
        };
        assert_eq!(record.next_update, record.last_update + Duration::hours(6));
    }

    #[test]
    fn is_due_with_simulated_clock() {
        let now = Utc::now();
        let record = FreshnessRecord {
            location_id: 71,
            last_update: now,
            next_update: now + Duration::hours(12),
        };
        assert!(!is_due(&record, now));
        assert!(!is_due(&record, now + Duration::hours(11)));
        assert!(is_due(&record, now + Duration::hours(12)));
        assert!(is_due(&record, now + Duration::hours(13)));
    }

    #[tokio::test]
    async fn read_errors_fail_open() {
        let store = Arc::new(MemoryEventStore::new());
        let tracker = FreshnessTracker::new(Arc::clone(&store), 12);

        let result = tracker.mark_refreshed(71).await;
        assert!(result.is_ok());

        store.fail_reads(true);
        assert!(tracker.needs_refresh(71).await);
    }

    #[tokio::test]
    async fn write_errors_propagate_from_stamp() {
        let store = Arc::new(MemoryEventStore::new());
        let tracker = FreshnessTracker::new(Arc::clone(&store), 12);

        store.fail_writes(true);
        let result = tracker.mark_refreshed(71).await;
        assert!(matches!(result, Err(GatewayError::PersistenceError(_))));
    }
}
