//! Fetch orchestrator: one full refresh cycle for one city.
//!
//! Both provider fetches start together and settle independently; a failed
//! fetch or a failed write on one source never stops the other. Whatever
//! happens per source, the cycle ends with a freshness stamp so an empty
//! or broken city is not refetched on every request.

use std::sync::Arc;

use crate::domain::{EventSource, normalize};
use crate::error::GatewayError;
use crate::persistence::EventStore;
use crate::providers::EventSources;
use crate::service::FreshnessTracker;
use crate::service::reconcile::reconcile_source;

/// Per-source row counts of a completed refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Rows written from the Edmtrain feed.
    pub edmtrain_written: u64,
    /// Rows written from the Ticketmaster feed.
    pub ticketmaster_written: u64,
}

/// Orchestrates refresh cycles: fetch both providers, normalize, reconcile
/// serially per source, stamp freshness.
#[derive(Debug)]
pub struct RefreshService<S, P> {
    store: Arc<S>,
    sources: Arc<P>,
    freshness: FreshnessTracker<S>,
}

impl<S: EventStore, P: EventSources> RefreshService<S, P> {
    /// Creates a new refresh service.
    #[must_use]
    pub fn new(store: Arc<S>, sources: Arc<P>, freshness: FreshnessTracker<S>) -> Self {
        Self {
            store,
            sources,
            freshness,
        }
    }

    /// Runs one refresh cycle for a city to completion.
    ///
    /// Provider fetches are initiated together and awaited settle-all; per
    /// source, fetch failures are logged and the source skipped, while
    /// reconcile failures are captured without stopping the sibling source.
    /// The freshness stamp runs unconditionally afterward — including when
    /// both feeds came back empty, which prevents a refetch storm for
    /// cities with no listings.
    ///
    /// # Errors
    ///
    /// Returns the freshness-stamp error if stamping fails, else the first
    /// captured reconcile error, so the webhook caller can surface it.
    pub async fn refresh_city(
        &self,
        location_id: i64,
        location_name: &str,
    ) -> Result<RefreshOutcome, GatewayError> {
        tracing::info!(location_id, location_name, "starting refresh cycle");

        let (edmtrain, ticketmaster) = tokio::join!(
            self.sources.fetch_edmtrain(location_id, location_name),
            self.sources.fetch_ticketmaster(location_name),
        );

        let mut outcome = RefreshOutcome::default();
        let mut first_error: Option<GatewayError> = None;

        // Sources reconcile serially: Edmtrain fully before Ticketmaster,
        // so a location never has two concurrent writers within one cycle.
        match edmtrain {
            Ok(events) => {
                let normalized = normalize::normalize_edmtrain(events, location_id);
                match reconcile_source(
                    self.store.as_ref(),
                    normalized,
                    EventSource::Edmtrain,
                    location_id,
                    location_name,
                )
                .await
                {
                    Ok(written) => outcome.edmtrain_written = written,
                    Err(error) => {
                        tracing::error!(location_name, %error, "edmtrain reconcile failed");
                        first_error.get_or_insert(error);
                    }
                }
            }
            Err(error) => {
                tracing::warn!(location_name, %error, "edmtrain fetch failed, skipping source");
            }
        }

        match ticketmaster {
            Ok(events) => {
                let normalized = normalize::normalize_ticketmaster(events, location_id);
                match reconcile_source(
                    self.store.as_ref(),
                    normalized,
                    EventSource::Ticketmaster,
                    location_id,
                    location_name,
                )
                .await
                {
                    Ok(written) => outcome.ticketmaster_written = written,
                    Err(error) => {
                        tracing::error!(location_name, %error, "ticketmaster reconcile failed");
                        first_error.get_or_insert(error);
                    }
                }
            }
            Err(error) => {
                tracing::warn!(location_name, %error, "ticketmaster fetch failed, skipping source");
            }
        }

        self.freshness.mark_refreshed(location_id).await?;

        if let Some(error) = first_error {
            return Err(error);
        }
        tracing::info!(
            location_id,
            location_name,
            edmtrain = outcome.edmtrain_written,
            ticketmaster = outcome.ticketmaster_written,
            "refresh cycle complete"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::memory::MemoryEventStore;
    use crate::providers::edmtrain::EdmtrainEvent;
    use crate::providers::ticketmaster::{EventDates, EventStart, TicketmasterEvent};
    use crate::providers::ProviderError;
    use async_trait::async_trait;

    /// Stub provider pair; `None` for a feed makes its fetch fail.
    #[derive(Debug, Default)]
    struct StubSources {
        edmtrain: Option<Vec<EdmtrainEvent>>,
        ticketmaster: Option<Vec<TicketmasterEvent>>,
    }

    #[async_trait]
    impl EventSources for StubSources {
        async fn fetch_edmtrain(
            &self,
            _location_id: i64,
            _location_name: &str,
        ) -> Result<Vec<EdmtrainEvent>, ProviderError> {
            self.edmtrain.clone().ok_or(ProviderError::Status {
                provider: "edmtrain",
                status: 503,
            })
        }

        async fn fetch_ticketmaster(
            &self,
            _city_name: &str,
        ) -> Result<Vec<TicketmasterEvent>, ProviderError> {
            self.ticketmaster.clone().ok_or(ProviderError::Status {
                provider: "ticketmaster",
                status: 503,
            })
        }
    }

    fn edmtrain_event(id: i64) -> EdmtrainEvent {
        EdmtrainEvent {
            id,
            link: None,
            name: Some(format!("show {id}")),
            ages: None,
            festival_ind: false,
            livestream_ind: false,
            electronic_genre_ind: true,
            other_genre_ind: false,
            date: Some("2026-09-12".to_string()),
            start_time: None,
            end_time: None,
            created_date: None,
            venue: None,
            artist_list: Vec::new(),
        }
    }

    fn ticketmaster_event(id: &str) -> TicketmasterEvent {
        TicketmasterEvent {
            id: id.to_string(),
            url: None,
            name: Some(format!("show {id}")),
            age_restrictions: None,
            classifications: Vec::new(),
            dates: Some(EventDates {
                start: Some(EventStart {
                    local_date: Some("2026-10-03".to_string()),
                    local_time: None,
                }),
            }),
            embedded: None,
        }
    }

    fn service(
        store: &Arc<MemoryEventStore>,
        sources: StubSources,
    ) -> RefreshService<MemoryEventStore, StubSources> {
        RefreshService::new(
            Arc::clone(store),
            Arc::new(sources),
            FreshnessTracker::new(Arc::clone(store), 12),
        )
    }

    #[tokio::test]
    async fn both_feeds_land_in_store_and_stamp() {
        let store = Arc::new(MemoryEventStore::new());
        let service = service(
            &store,
            StubSources {
                edmtrain: Some(vec![edmtrain_event(1), edmtrain_event(2)]),
                ticketmaster: Some(vec![ticketmaster_event("G5vYZ9p1bFeAd")]),
            },
        );

        let outcome = service.refresh_city(71, "chicago").await;
        assert_eq!(
            outcome.ok(),
            Some(RefreshOutcome {
                edmtrain_written: 2,
                ticketmaster_written: 1,
            })
        );
        assert_eq!(store.event_count(), 3);
        assert!(store.freshness(71).is_some());
    }

    #[tokio::test]
    async fn failed_fetch_does_not_stop_sibling_source() {
        let store = Arc::new(MemoryEventStore::new());
        let service = service(
            &store,
            StubSources {
                edmtrain: None,
                ticketmaster: Some(vec![ticketmaster_event("G5vYZ9p1bFeAd")]),
            },
        );

        let outcome = service.refresh_city(71, "chicago").await;
        assert_eq!(
            outcome.ok(),
            Some(RefreshOutcome {
                edmtrain_written: 0,
                ticketmaster_written: 1,
            })
        );
        assert_eq!(store.event_count(), 1);
        assert!(store.freshness(71).is_some());
    }

    #[tokio::test]
    async fn empty_feeds_still_stamp_freshness() {
        let store = Arc::new(MemoryEventStore::new());
        let service = service(
            &store,
            StubSources {
                edmtrain: Some(Vec::new()),
                ticketmaster: Some(Vec::new()),
            },
        );

        let outcome = service.refresh_city(71, "chicago").await;
        assert_eq!(outcome.ok(), Some(RefreshOutcome::default()));
        assert_eq!(store.event_count(), 0);
        assert!(store.freshness(71).is_some(), "empty city must still be stamped");
    }

    #[tokio::test]
    async fn both_fetches_failing_still_stamps() {
        let store = Arc::new(MemoryEventStore::new());
        let service = service(&store, StubSources::default());

        let outcome = service.refresh_city(71, "chicago").await;
        assert_eq!(outcome.ok(), Some(RefreshOutcome::default()));
        assert!(store.freshness(71).is_some());
    }

    #[tokio::test]
    async fn end_to_end_city_flow() {
        let store = Arc::new(MemoryEventStore::new());
        let tracker = FreshnessTracker::new(Arc::clone(&store), 12);
        let service = service(
            &store,
            StubSources {
                edmtrain: Some(vec![edmtrain_event(1)]),
                ticketmaster: Some(vec![ticketmaster_event("G5vYZ9p1bFeAd")]),
            },
        );

        // First sighting of the city: stale, cycle runs, union lands.
        assert!(tracker.needs_refresh(71).await);
        let outcome = service.refresh_city(71, "chicago").await;
        assert!(outcome.is_ok());

        let events = store.events_for_location(71).await;
        assert_eq!(events.map(|e| e.len()).ok(), Some(2));

        // Before TTL expiry the city reads fresh.
        assert!(!tracker.needs_refresh(71).await);
    }
}
