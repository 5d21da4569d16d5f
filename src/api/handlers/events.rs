//! Events read endpoint: serve from the store, refresh in the background.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{CacheStatus, EventsResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};
use crate::persistence::EventStore;

/// `GET /events/{id}/{city}` — Events for a location, cache-first.
///
/// Always answers immediately from the store. When the location's cache is
/// past its TTL (or has never been fetched), a background refresh is
/// dispatched fire-and-forget and the response reports
/// `cacheStatus: "updating"`; a refresh-path problem can never fail this
/// request.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a non-numeric ID and
/// [`GatewayError::PersistenceError`] if the store read fails.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/{city}",
    tag = "Events",
    summary = "List events for a city",
    description = "Returns cached events for the location ordered by date. A stale cache triggers an asynchronous refresh; the response never waits for it.",
    params(
        ("id" = i64, Path, description = "Numeric location ID"),
        ("city" = String, Path, description = "City name, e.g. `chicago`"),
    ),
    responses(
        (status = 200, description = "Cached events", body = EventsResponse),
        (status = 400, description = "Non-numeric location ID", body = ErrorResponse),
        (status = 500, description = "Store read failure", body = ErrorResponse),
    )
)]
pub async fn get_events(
    State(state): State<AppState>,
    Path((id, city)): Path<(String, String)>,
) -> Result<impl IntoResponse, GatewayError> {
    let location_id: i64 = id
        .parse()
        .map_err(|_| GatewayError::InvalidRequest("location id must be numeric".to_string()))?;

    let needs_refresh = state.freshness.needs_refresh(location_id).await;
    if needs_refresh {
        tracing::info!(location_id, %city, "cache stale, dispatching background refresh");
        state.dispatcher.dispatch(location_id, &city);
    }

    let events = state.store.events_for_location(location_id).await?;
    let count = events.len();
    Ok(Json(EventsResponse {
        data: events,
        id: location_id,
        city,
        cache_status: if needs_refresh {
            CacheStatus::Updating
        } else {
            CacheStatus::Fresh
        },
        count,
    }))
}

/// Events routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/events/{id}/{city}", get(get_events))
}
