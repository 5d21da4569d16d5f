//! Periodic sweep deleting events whose date has passed.
//!
//! The reconciler's upsert policy leaves rows behind when an event drops
//! out of a provider feed; this sweep is what eventually removes them,
//! together with everything that simply already happened.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::error::GatewayError;
use crate::persistence::EventStore;

/// Deletes all events dated before today. Returns the rows removed.
///
/// # Errors
///
/// Returns [`GatewayError::PersistenceError`] on store failure.
pub async fn sweep_past_events<S: EventStore>(store: &S) -> Result<u64, GatewayError> {
    let today = Utc::now().date_naive();
    let removed = store.delete_past_events(today).await?;
    if removed > 0 {
        tracing::info!(removed, "deleted past events");
    } else {
        tracing::debug!("no past events to delete");
    }
    Ok(removed)
}

/// Spawns the background sweeper running [`sweep_past_events`] on a fixed
/// interval. Sweep failures are logged and the loop continues.
pub fn spawn_sweeper<S: EventStore + 'static>(
    store: Arc<S>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(error) = sweep_past_events(store.as_ref()).await {
                tracing::error!(%error, "past-event sweep failed");
            }
        }
    })
}
