//! Edmtrain listing API client and payload shapes.
//!
//! Edmtrain keys event searches by numeric location ID and authenticates
//! with a `client` query parameter. A missing key downgrades to an empty
//! batch with a warning so a partially configured deployment still serves
//! the other source.

use serde::Deserialize;

use super::ProviderError;

const PROVIDER: &str = "edmtrain";

/// Edmtrain client configuration, carved out of the gateway config.
#[derive(Debug, Clone)]
pub struct EdmtrainConfig {
    /// API client key; fetches are skipped when `None`.
    pub api_key: Option<String>,
    /// Events endpoint base URL.
    pub base_url: String,
}

/// Top-level Edmtrain response envelope.
#[derive(Debug, Deserialize)]
pub struct EdmtrainResponse {
    /// Event payload; absent on error responses.
    #[serde(default)]
    pub data: Vec<EdmtrainEvent>,
}

/// One event as returned by the Edmtrain API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdmtrainEvent {
    /// Provider-native numeric event ID, trusted as the canonical ID.
    pub id: i64,
    /// Event page URL.
    pub link: Option<String>,
    /// Event name; often null for single-artist shows.
    pub name: Option<String>,
    /// Age restriction tag.
    pub ages: Option<String>,
    /// Festival indicator.
    #[serde(default)]
    pub festival_ind: bool,
    /// Livestream indicator.
    #[serde(default)]
    pub livestream_ind: bool,
    /// Electronic genre indicator.
    #[serde(default)]
    pub electronic_genre_ind: bool,
    /// Non-electronic genre indicator.
    #[serde(default)]
    pub other_genre_ind: bool,
    /// Event date, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Local start time, `HH:MM:SS`.
    pub start_time: Option<String>,
    /// Local end time, `HH:MM:SS`.
    pub end_time: Option<String>,
    /// Listing creation timestamp, RFC 3339.
    pub created_date: Option<String>,
    /// Venue details.
    pub venue: Option<EdmtrainVenue>,
    /// Artist lineup.
    #[serde(default)]
    pub artist_list: Vec<EdmtrainArtist>,
}

/// Venue sub-object in an Edmtrain event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdmtrainVenue {
    /// Provider-native venue ID.
    pub id: i64,
    /// Venue name.
    pub name: Option<String>,
    /// "City, ST" display string.
    pub location: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// State name.
    pub state: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
}

/// Artist sub-object in an Edmtrain event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdmtrainArtist {
    /// Provider-native artist ID.
    pub id: i64,
    /// Artist name.
    pub name: Option<String>,
    /// Artist page URL.
    pub link: Option<String>,
    /// Back-to-back set indicator.
    #[serde(default)]
    pub b2b_ind: bool,
}

/// Fetches Edmtrain events for a location.
///
/// # Errors
///
/// Returns [`ProviderError`] on transport failure or a non-success status.
pub async fn fetch_events(
    client: &reqwest::Client,
    config: &EdmtrainConfig,
    location_id: i64,
    location_name: &str,
) -> Result<Vec<EdmtrainEvent>, ProviderError> {
    let Some(api_key) = config.api_key.as_deref() else {
        tracing::warn!(location_name, "edmtrain api key not configured, skipping fetch");
        return Ok(Vec::new());
    };

    let response = client
        .get(&config.base_url)
        .query(&[
            ("locationIds", location_id.to_string().as_str()),
            ("client", api_key),
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

    let envelope: EdmtrainResponse =
        response.json().await.map_err(|e| ProviderError::Transport {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

    tracing::info!(
        location_id,
        location_name,
        count = envelope.data.len(),
        "edmtrain fetch complete"
    );
    Ok(envelope.data)
}
