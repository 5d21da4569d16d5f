//! Request/response types for the webhook refresh endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// City ID as sent by webhook callers: either a JSON number or a numeric
/// string (the in-process dispatcher sends a string, matching the original
/// caller convention).
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CityId {
    /// Numeric form.
    Number(i64),
    /// String form, parsed on use.
    Text(String),
}

impl CityId {
    /// Returns the numeric city ID, `None` for a non-numeric string.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(id) => Some(*id),
            Self::Text(raw) => raw.parse().ok(),
        }
    }
}

/// Request body of `POST /api/v1/webhook/fetch-data`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FetchDataRequest {
    /// Location to refresh.
    pub city_id: CityId,
    /// City name forwarded to the providers.
    pub city_name: String,
}

/// Success body of `POST /api/v1/webhook/fetch-data`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FetchDataResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// Refreshed location ID.
    pub city_id: i64,
    /// Refreshed city name.
    pub city_name: String,
    /// Wall-clock duration of the refresh cycle in milliseconds.
    pub duration_ms: u64,
    /// Completion timestamp.
    pub timestamp: DateTime<Utc>,
}
