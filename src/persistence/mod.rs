//! Persistence layer: the [`EventStore`] seam and its PostgreSQL
//! implementation.
//!
//! The store is treated as a generic relational surface: query, insert,
//! upsert, and delete on the `events` table plus the `cache_control`
//! freshness table. Service-layer code depends only on the trait, so tests
//! run against the in-memory implementation.

pub mod models;
pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{CanonicalEvent, EventSource};
use crate::error::GatewayError;
pub use models::{EventKey, FreshnessRecord};
pub use postgres::PgEventStore;

/// Storage operations required by the read path, the reconciler, the
/// freshness tracker, and the cleanup sweep.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Returns all events for a location, ordered by date ascending.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    async fn events_for_location(
        &self,
        location_id: i64,
    ) -> Result<Vec<CanonicalEvent>, GatewayError>;

    /// Returns the identity keys of stored rows matching any of the given
    /// IDs, for cross-source collision detection.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    async fn event_keys_for_ids(&self, ids: &[i64]) -> Result<Vec<EventKey>, GatewayError>;

    /// Upserts a batch of events, conflict key `id`. Returns the number of
    /// rows written.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    async fn upsert_events(&self, events: &[CanonicalEvent]) -> Result<u64, GatewayError>;

    /// Deletes all rows for one (location, source) pair. Returns the number
    /// of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    async fn delete_events_by_source(
        &self,
        location_id: i64,
        source: EventSource,
    ) -> Result<u64, GatewayError>;

    /// Deletes events dated strictly before `cutoff`. Returns the number of
    /// rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    async fn delete_past_events(&self, cutoff: NaiveDate) -> Result<u64, GatewayError>;

    /// Returns the freshness record for a location, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    async fn freshness_for_location(
        &self,
        location_id: i64,
    ) -> Result<Option<FreshnessRecord>, GatewayError>;

    /// Inserts a freshness record for a location seen for the first time.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    async fn insert_freshness(&self, record: &FreshnessRecord) -> Result<(), GatewayError>;

    /// Upserts a freshness record, conflict key `location_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    async fn upsert_freshness(&self, record: &FreshnessRecord) -> Result<(), GatewayError>;
}
