//! Ticketmaster Discovery API client and payload shapes.
//!
//! Searches are keyed by city name and pre-filtered to the Dance/Electronic
//! genre classification so the normalizer mostly sees relevant listings.
//! An empty city name is the "no city" sentinel and short-circuits to an
//! empty result.

use serde::Deserialize;

use super::ProviderError;

const PROVIDER: &str = "ticketmaster";

/// Dance/Electronic genre classification ID in the Discovery API.
const DANCE_ELECTRONIC_GENRE_ID: &str = "KnvZfZ7vAvF";

/// Ticketmaster client configuration, carved out of the gateway config.
#[derive(Debug, Clone)]
pub struct TicketmasterConfig {
    /// Discovery API key; fetches are skipped when `None`.
    pub api_key: Option<String>,
    /// Events endpoint base URL.
    pub base_url: String,
}

/// Top-level Discovery response envelope.
#[derive(Debug, Deserialize)]
pub struct TicketmasterResponse {
    /// HAL-style embedded payload; absent when the search matched nothing.
    #[serde(rename = "_embedded")]
    pub embedded: Option<TicketmasterEmbeddedEvents>,
}

/// `_embedded` wrapper holding the event list.
#[derive(Debug, Deserialize)]
pub struct TicketmasterEmbeddedEvents {
    /// Matched events.
    #[serde(default)]
    pub events: Vec<TicketmasterEvent>,
}

/// One event as returned by the Discovery API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketmasterEvent {
    /// Provider-native opaque string ID, hashed into the derived range.
    pub id: String,
    /// Event page URL.
    pub url: Option<String>,
    /// Event name.
    pub name: Option<String>,
    /// Age restriction info.
    pub age_restrictions: Option<AgeRestrictions>,
    /// Genre classifications; first entry is the primary one.
    #[serde(default)]
    pub classifications: Vec<Classification>,
    /// Date block.
    pub dates: Option<EventDates>,
    /// HAL-style embedded venue and attraction data.
    #[serde(rename = "_embedded")]
    pub embedded: Option<EventEmbedded>,
}

/// Age restriction sub-object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeRestrictions {
    /// Whether a legal age limit is enforced at the door.
    #[serde(default)]
    pub legal_age_enforced: bool,
}

/// Genre classification sub-object.
#[derive(Debug, Clone, Deserialize)]
pub struct Classification {
    /// Genre of this classification.
    pub genre: Option<NamedRef>,
}

/// Generic `{id?, name?}` reference used across the Discovery payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    /// Display name.
    pub name: Option<String>,
}

/// Date block of a Discovery event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDates {
    /// Start date/time info.
    pub start: Option<EventStart>,
}

/// Start sub-object inside the date block.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStart {
    /// Local calendar date, `YYYY-MM-DD`.
    pub local_date: Option<String>,
    /// Local start time, `HH:MM:SS`.
    pub local_time: Option<String>,
}

/// Embedded venue/attraction data of one event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEmbedded {
    /// Venues; the first is the primary venue.
    #[serde(default)]
    pub venues: Vec<TicketmasterVenue>,
    /// Performing attractions (artists).
    #[serde(default)]
    pub attractions: Vec<TicketmasterAttraction>,
}

/// Venue as returned by the Discovery API.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketmasterVenue {
    /// Provider-native opaque venue ID.
    pub id: String,
    /// Venue name.
    pub name: Option<String>,
    /// City reference.
    pub city: Option<NamedRef>,
    /// State reference.
    pub state: Option<StateRef>,
    /// Country reference.
    pub country: Option<NamedRef>,
    /// Street address.
    pub address: Option<AddressRef>,
    /// Geographic coordinates, stringly typed upstream.
    pub location: Option<GeoRef>,
}

/// State reference with both name and two-letter code.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRef {
    /// Full state name.
    pub name: Option<String>,
    /// Two-letter state code.
    pub state_code: Option<String>,
}

/// Street address sub-object.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressRef {
    /// First address line.
    pub line1: Option<String>,
}

/// Latitude/longitude pair, serialized as strings upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoRef {
    /// Latitude string.
    pub latitude: Option<String>,
    /// Longitude string.
    pub longitude: Option<String>,
}

/// Attraction (artist) as returned by the Discovery API.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketmasterAttraction {
    /// Provider-native opaque attraction ID.
    pub id: Option<String>,
    /// Attraction name.
    pub name: Option<String>,
    /// Attraction page URL.
    pub url: Option<String>,
}

/// Fetches Ticketmaster Dance/Electronic events for a city.
///
/// # Errors
///
/// Returns [`ProviderError`] on transport failure or a non-success status.
pub async fn fetch_events(
    client: &reqwest::Client,
    config: &TicketmasterConfig,
    city_name: &str,
) -> Result<Vec<TicketmasterEvent>, ProviderError> {
    if city_name.is_empty() {
        tracing::info!("ticketmaster fetch skipped: no city");
        return Ok(Vec::new());
    }
    let Some(api_key) = config.api_key.as_deref() else {
        tracing::warn!(city_name, "ticketmaster api key not configured, skipping fetch");
        return Ok(Vec::new());
    };

    let response = client
        .get(&config.base_url)
        .query(&[
            ("apikey", api_key),
            ("genreId", DANCE_ELECTRONIC_GENRE_ID),
            ("city", city_name),
        ])
        .send()
        .await
        .map_err(|e| ProviderError::Transport {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            provider: PROVIDER,
            status: status.as_u16(),
        });
    }

    let envelope: TicketmasterResponse =
        response.json().await.map_err(|e| ProviderError::Transport {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

    let events = envelope.embedded.map(|e| e.events).unwrap_or_default();
    tracing::info!(city_name, count = events.len(), "ticketmaster fetch complete");
    Ok(events)
}
