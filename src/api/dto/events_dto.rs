//! Response types for the events read endpoint.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::CanonicalEvent;

/// Whether this request found the cache fresh or triggered a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Cached events are within their TTL; nothing was triggered.
    Fresh,
    /// This request found the cache stale and dispatched a background
    /// refresh; the returned data is the previous cached state.
    Updating,
}

/// Response body of `GET /api/v1/events/{id}/{city}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    /// Events for the location, ordered by date ascending.
    pub data: Vec<CanonicalEvent>,
    /// Echo of the requested location ID.
    pub id: i64,
    /// Echo of the requested city name.
    pub city: String,
    /// Cache freshness as seen by this request.
    pub cache_status: CacheStatus,
    /// Number of events returned.
    pub count: usize,
}
