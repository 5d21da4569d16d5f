//! Canonical event record shared by both upstream sources.
//!
//! [`CanonicalEvent`] is the one shape every provider feed is normalized
//! into and the row shape persisted in the `events` table. Nested venue
//! and artist data stay optional end to end: a provider omitting them must
//! never fail an item.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Upstream source an event was fetched from.
///
/// The discriminator persisted alongside every event row; reconciliation
/// uses it to guarantee one source never overwrites another source's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    /// Edmtrain listing API (native numeric event IDs).
    Edmtrain,
    /// Ticketmaster Discovery API (string event IDs, hashed into a
    /// disjoint numeric range).
    Ticketmaster,
}

impl EventSource {
    /// Returns the lowercase tag stored in the `source` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Edmtrain => "edmtrain",
            Self::Ticketmaster => "ticketmaster",
        }
    }

    /// Parses the stored column tag back into a source.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "edmtrain" => Some(Self::Edmtrain),
            "ticketmaster" => Some(Self::Ticketmaster),
            _ => None,
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Venue attached to an event, when the provider supplies one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    /// Venue identifier (provider-native or hash-derived).
    pub id: i64,
    /// Venue name.
    pub name: Option<String>,
    /// Short "City, ST" display string.
    pub location: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// State or region name.
    pub state: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
}

/// One entry in an event's artist lineup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    /// Artist identifier (provider-native or hash-derived).
    pub id: i64,
    /// Artist name.
    pub name: Option<String>,
    /// Artist page URL.
    pub link: Option<String>,
    /// Whether this slot is a back-to-back set.
    #[serde(rename = "b2bInd")]
    pub b2b_flag: bool,
}

/// The normalized, cross-source event shape persisted in the store.
///
/// # Invariant
///
/// `id` is unique in the store regardless of source: Edmtrain rows carry
/// the provider's own ID, Ticketmaster rows carry a deterministic derived
/// ID offset above [`super::DERIVED_ID_FLOOR`]. Residual collisions are
/// detected and dropped at reconciliation time, never silently overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    /// Globally unique event identifier across both sources.
    pub id: i64,
    /// Which upstream feed this event came from.
    pub source: EventSource,
    /// Event page URL.
    pub link: Option<String>,
    /// Event name. Edmtrain frequently omits this for single-artist shows.
    pub name: Option<String>,
    /// Age restriction tag, e.g. `"18+"`.
    pub ages: Option<String>,
    /// Festival indicator.
    pub festival_flag: bool,
    /// Livestream indicator.
    pub livestream_flag: bool,
    /// Electronic / dance genre indicator.
    pub electronic_genre_flag: bool,
    /// Non-electronic genre indicator.
    pub other_genre_flag: bool,
    /// Calendar date of the event. Required; events without one are
    /// dropped during normalization.
    pub date: NaiveDate,
    /// Local start time, when known.
    pub start_time: Option<NaiveTime>,
    /// Local end time, when known.
    pub end_time: Option<NaiveTime>,
    /// When the listing was first created upstream (falls back to
    /// normalization time).
    pub created_date: DateTime<Utc>,
    /// Venue details, when the provider supplies them.
    pub venue: Option<Venue>,
    /// Ordered artist lineup. Empty when unknown.
    pub artist_list: Vec<Artist>,
    /// Location (city) this event belongs to.
    pub location_id: i64,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn source_tag_round_trip() {
        assert_eq!(EventSource::parse("edmtrain"), Some(EventSource::Edmtrain));
        assert_eq!(
            EventSource::parse("ticketmaster"),
            Some(EventSource::Ticketmaster)
        );
        assert_eq!(EventSource::parse("bandcamp"), None);
        assert_eq!(EventSource::Edmtrain.as_str(), "edmtrain");
    }

    #[test]
    fn source_serializes_lowercase() {
        let json = serde_json::to_string(&EventSource::Ticketmaster).ok();
        assert_eq!(json.as_deref(), Some("\"ticketmaster\""));
    }

    #[test]
    fn artist_b2b_field_uses_provider_name() {
        let artist = Artist {
            id: 7,
            name: Some("Four Tet".to_string()),
            link: None,
            b2b_flag: true,
        };
        let json = serde_json::to_value(&artist).ok();
        let Some(json) = json else {
            panic!("artist serialization failed");
        };
        assert_eq!(json.get("b2bInd"), Some(&serde_json::Value::Bool(true)));
    }
}
