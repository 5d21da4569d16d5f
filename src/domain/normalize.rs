//! Per-provider normalizers producing [`CanonicalEvent`] batches.
//!
//! Both normalizers are total over well-formed input and apply
//! partial-failure semantics at item granularity: an item missing its
//! required calendar date is dropped with a warning, the rest of the batch
//! proceeds. Missing nested venue/classification data never fails an item.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::event::{Artist, CanonicalEvent, EventSource, Venue};
use super::event_id::{derived_event_id, derived_numeric_id};
use crate::providers::edmtrain::EdmtrainEvent;
use crate::providers::ticketmaster::TicketmasterEvent;

/// Converts an Edmtrain batch into canonical events for one location.
///
/// Edmtrain's numeric event IDs are trusted and used directly.
#[must_use]
pub fn normalize_edmtrain(events: Vec<EdmtrainEvent>, location_id: i64) -> Vec<CanonicalEvent> {
    events
        .into_iter()
        .filter_map(|event| {
            let Some(date) = event.date.as_deref().and_then(parse_date) else {
                tracing::warn!(
                    source = %EventSource::Edmtrain,
                    event_id = event.id,
                    "dropping event without a parseable date"
                );
                return None;
            };

            Some(CanonicalEvent {
                id: event.id,
                source: EventSource::Edmtrain,
                link: event.link,
                name: event.name,
                ages: event.ages,
                festival_flag: event.festival_ind,
                livestream_flag: event.livestream_ind,
                electronic_genre_flag: event.electronic_genre_ind,
                other_genre_flag: event.other_genre_ind,
                date,
                start_time: event.start_time.as_deref().and_then(parse_time),
                end_time: event.end_time.as_deref().and_then(parse_time),
                created_date: event
                    .created_date
                    .as_deref()
                    .and_then(parse_timestamp)
                    .unwrap_or_else(Utc::now),
                venue: event.venue.map(|v| Venue {
                    id: v.id,
                    name: v.name,
                    location: v.location,
                    address: v.address,
                    state: v.state,
                    country: v.country,
                    latitude: v.latitude,
                    longitude: v.longitude,
                }),
                artist_list: event
                    .artist_list
                    .into_iter()
                    .map(|a| Artist {
                        id: a.id,
                        name: a.name,
                        link: a.link,
                        b2b_flag: a.b2b_ind,
                    })
                    .collect(),
                location_id,
            })
        })
        .collect()
}

/// Converts a Ticketmaster batch into canonical events for one location.
///
/// Ticketmaster has no shared ID space with Edmtrain, so the canonical ID
/// is derived from the provider's string ID via
/// [`derived_event_id`]; the derivation is deterministic, making repeated
/// fetches of the same upstream event upsert-idempotent.
#[must_use]
pub fn normalize_ticketmaster(
    events: Vec<TicketmasterEvent>,
    location_id: i64,
) -> Vec<CanonicalEvent> {
    events
        .into_iter()
        .filter_map(|event| {
            let date = event
                .dates
                .as_ref()
                .and_then(|d| d.start.as_ref())
                .and_then(|s| s.local_date.as_deref())
                .and_then(parse_date);
            let Some(date) = date else {
                tracing::warn!(
                    source = %EventSource::Ticketmaster,
                    event_id = %event.id,
                    "dropping event without a parseable date"
                );
                return None;
            };

            let genre = event
                .classifications
                .first()
                .and_then(|c| c.genre.as_ref())
                .and_then(|g| g.name.as_deref())
                .map(str::to_lowercase);
            let electronic_genre_flag = genre
                .as_deref()
                .is_some_and(|g| g.contains("electronic") || g.contains("dance"));
            let other_genre_flag = genre.is_some() && !electronic_genre_flag;

            let start_time = event
                .dates
                .as_ref()
                .and_then(|d| d.start.as_ref())
                .and_then(|s| s.local_time.as_deref())
                .and_then(parse_time);

            let (venue, artist_list) = match event.embedded {
                Some(embedded) => {
                    let venue = embedded.venues.into_iter().next().map(|v| Venue {
                        id: derived_numeric_id(&v.id),
                        name: v.name,
                        location: venue_location(
                            v.city.as_ref().and_then(|c| c.name.as_deref()),
                            v.state.as_ref().and_then(|s| s.state_code.as_deref()),
                        ),
                        address: v.address.and_then(|a| a.line1),
                        state: v.state.and_then(|s| s.name),
                        country: v.country.and_then(|c| c.name),
                        latitude: v
                            .location
                            .as_ref()
                            .and_then(|l| l.latitude.as_deref())
                            .and_then(|l| l.parse().ok()),
                        longitude: v
                            .location
                            .as_ref()
                            .and_then(|l| l.longitude.as_deref())
                            .and_then(|l| l.parse().ok()),
                    });
                    let artists = embedded
                        .attractions
                        .into_iter()
                        .map(|a| Artist {
                            id: a
                                .id
                                .as_deref()
                                .map(derived_numeric_id)
                                .unwrap_or_default(),
                            name: a.name,
                            link: a.url,
                            b2b_flag: false,
                        })
                        .collect();
                    (venue, artists)
                }
                None => (None, Vec::new()),
            };

            Some(CanonicalEvent {
                id: derived_event_id(EventSource::Ticketmaster, &event.id),
                source: EventSource::Ticketmaster,
                link: event.url,
                name: event.name,
                ages: event
                    .age_restrictions
                    .is_some_and(|a| a.legal_age_enforced)
                    .then(|| "18+".to_string()),
                festival_flag: false,
                livestream_flag: false,
                electronic_genre_flag,
                other_genre_flag,
                date,
                start_time,
                end_time: None,
                created_date: Utc::now(),
                venue,
                artist_list,
                location_id,
            })
        })
        .collect()
}

/// Builds the short `"City, ST"` display string, `None` when both parts
/// are missing.
fn venue_location(city: Option<&str>, state_code: Option<&str>) -> Option<String> {
    match (city, state_code) {
        (Some(city), Some(code)) => Some(format!("{city}, {code}")),
        (Some(city), None) => Some(city.to_string()),
        (None, Some(code)) => Some(code.to_string()),
        (None, None) => None,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
