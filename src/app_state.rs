//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::PgEventStore;
use crate::service::FreshnessTracker;
use crate::service::dispatch::{AppRefreshService, RefreshDispatcher};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event store backing the read path.
    pub store: Arc<PgEventStore>,
    /// Per-location cache freshness tracker.
    pub freshness: FreshnessTracker<PgEventStore>,
    /// Fire-and-forget refresh dispatcher.
    pub dispatcher: Arc<RefreshDispatcher>,
    /// Refresh orchestrator, run synchronously by the webhook endpoint.
    pub refresh: Arc<AppRefreshService>,
    /// Shared secret expected on webhook requests.
    pub webhook_secret: String,
}
