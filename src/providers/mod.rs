//! Upstream provider clients: Edmtrain and Ticketmaster Discovery.
//!
//! Each provider is treated as an opaque fetcher returning its native JSON
//! shape; normalization into [`crate::domain::CanonicalEvent`] happens in
//! the domain layer. The [`EventSources`] trait is the seam the refresh
//! orchestrator depends on, so tests can substitute stub feeds.

pub mod edmtrain;
pub mod ticketmaster;

use async_trait::async_trait;

pub use edmtrain::EdmtrainEvent;
pub use ticketmaster::TicketmasterEvent;

/// Transport-level failure from an upstream provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure (connect, timeout, body decode).
    #[error("{provider} transport error: {message}")]
    Transport {
        /// Provider tag.
        provider: &'static str,
        /// Underlying transport error message.
        message: String,
    },

    /// Non-success HTTP status from the provider.
    #[error("{provider} returned status {status}")]
    Status {
        /// Provider tag.
        provider: &'static str,
        /// HTTP status code returned.
        status: u16,
    },
}

/// The two provider fetchers the refresh orchestrator draws from.
///
/// Both methods raise [`ProviderError`] on transport or HTTP failure; the
/// orchestrator isolates failures per source and never lets one provider
/// abort the other.
#[async_trait]
pub trait EventSources: Send + Sync {
    /// Fetches Edmtrain events for a location.
    ///
    /// Returns an empty batch with a warning when no API key is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport or HTTP failure.
    async fn fetch_edmtrain(
        &self,
        location_id: i64,
        location_name: &str,
    ) -> Result<Vec<EdmtrainEvent>, ProviderError>;

    /// Fetches Ticketmaster Dance/Electronic events for a city.
    ///
    /// An empty `city_name` is treated as "no city": an empty result, not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport or HTTP failure.
    async fn fetch_ticketmaster(
        &self,
        city_name: &str,
    ) -> Result<Vec<TicketmasterEvent>, ProviderError>;
}

/// Production [`EventSources`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpEventSources {
    client: reqwest::Client,
    edmtrain: edmtrain::EdmtrainConfig,
    ticketmaster: ticketmaster::TicketmasterConfig,
}

impl HttpEventSources {
    /// Builds the HTTP sources from provider configuration.
    ///
    /// # Errors
    ///
    /// Returns the underlying `reqwest` error if the client cannot be
    /// constructed.
    pub fn new(
        edmtrain: edmtrain::EdmtrainConfig,
        ticketmaster: ticketmaster::TicketmasterConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pulse-gateway/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            edmtrain,
            ticketmaster,
        })
    }
}

#[async_trait]
impl EventSources for HttpEventSources {
    async fn fetch_edmtrain(
        &self,
        location_id: i64,
        location_name: &str,
    ) -> Result<Vec<EdmtrainEvent>, ProviderError> {
        edmtrain::fetch_events(&self.client, &self.edmtrain, location_id, location_name).await
    }

    async fn fetch_ticketmaster(
        &self,
        city_name: &str,
    ) -> Result<Vec<TicketmasterEvent>, ProviderError> {
        ticketmaster::fetch_events(&self.client, &self.ticketmaster, city_name).await
    }
}
