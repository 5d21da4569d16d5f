//! Webhook refresh endpoint: the out-of-process dispatch target.
//!
//! Unlike the read path, this endpoint runs the fetch orchestrator to
//! completion and surfaces refresh failures to its caller — it *is* the
//! background invocation in a serverless deployment.

use std::time::Instant;

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{FetchDataRequest, FetchDataResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /webhook/fetch-data` — Run a refresh cycle synchronously.
///
/// Authenticated with the shared webhook secret as a bearer credential.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] on a missing or wrong secret,
/// [`GatewayError::InvalidRequest`] for a non-numeric city ID, and any
/// error the refresh cycle itself surfaced.
#[utoipa::path(
    post,
    path = "/api/v1/webhook/fetch-data",
    tag = "Webhook",
    summary = "Trigger a synchronous refresh",
    description = "Runs the full fetch/normalize/reconcile cycle for a city and reports its duration. Called by the webhook dispatcher; requires the shared secret as a bearer token.",
    request_body = FetchDataRequest,
    responses(
        (status = 200, description = "Refresh completed", body = FetchDataResponse),
        (status = 400, description = "Missing or non-numeric cityId", body = ErrorResponse),
        (status = 401, description = "Invalid webhook secret", body = ErrorResponse),
        (status = 500, description = "Refresh cycle failed", body = ErrorResponse),
    )
)]
pub async fn fetch_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<FetchDataRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let expected = format!("Bearer {}", state.webhook_secret);
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        tracing::warn!("unauthorized webhook request");
        return Err(GatewayError::Unauthorized(
            "invalid webhook secret".to_string(),
        ));
    }

    let city_id = request.city_id.as_i64().ok_or_else(|| {
        GatewayError::InvalidRequest("cityId must be a numeric value".to_string())
    })?;
    let city_name = request.city_name;

    tracing::info!(city_id, %city_name, "webhook executing refresh");
    let started = Instant::now();
    state.refresh.refresh_city(city_id, &city_name).await?;
    let duration_ms = started.elapsed().as_millis() as u64;

    tracing::info!(city_id, %city_name, duration_ms, "webhook refresh complete");
    Ok(Json(FetchDataResponse {
        success: true,
        city_id,
        city_name,
        duration_ms,
        timestamp: Utc::now(),
    }))
}

/// Webhook routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/webhook/fetch-data", post(fetch_data))
}
