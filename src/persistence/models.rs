//! Database-facing model types for the freshness and collision queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::EventSource;

/// Per-location freshness row from the `cache_control` table.
///
/// # Invariant
///
/// `next_update = last_update + TTL` after every successful refresh stamp.
/// A location with no row is maximally stale; the tracker creates one
/// lazily with `next_update = now` to force exactly one immediate refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessRecord {
    /// Location this record tracks.
    pub location_id: i64,
    /// Timestamp of the last completed refresh cycle.
    pub last_update: DateTime<Utc>,
    /// Timestamp after which a refresh is due again.
    pub next_update: DateTime<Utc>,
}

/// Identity triple of a stored event row, used for cross-source collision
/// checks before writing a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventKey {
    /// Canonical event ID.
    pub id: i64,
    /// Source that owns the stored row.
    pub source: EventSource,
    /// Location the stored row belongs to.
    pub location_id: i64,
}
