//! Fire-and-forget refresh dispatch.
//!
//! The read path decides a refresh is due but must never wait on it. How
//! the cycle actually runs depends on the deployment: a long-lived process
//! spawns it in-process, a serverless deployment hands it to a separate
//! invocation via the webhook endpoint (request compute is torn down right
//! after the response is flushed, so in-process background work would be
//! killed mid-cycle). The mode is resolved once at startup from
//! configuration.

use std::sync::Arc;

use serde_json::json;

use crate::persistence::PgEventStore;
use crate::providers::HttpEventSources;
use crate::service::RefreshService;

/// Refresh service type wired with the production store and providers.
pub type AppRefreshService = RefreshService<PgEventStore, HttpEventSources>;

/// How background refreshes are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Spawn the cycle as an in-process background task.
    #[default]
    InProcess,
    /// POST to the webhook endpoint so a separate invocation runs it.
    Webhook,
}

impl DispatchMode {
    /// Parses the `DISPATCH_MODE` configuration value. Unknown values fall
    /// back to [`DispatchMode::InProcess`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "webhook" => Self::Webhook,
            _ => Self::InProcess,
        }
    }
}

/// Dispatches refresh cycles without ever blocking or failing the caller.
#[derive(Debug)]
pub enum RefreshDispatcher {
    /// Direct in-process execution.
    InProcess {
        /// The refresh service spawned per dispatch.
        refresh: Arc<AppRefreshService>,
    },
    /// Out-of-process execution via the webhook endpoint.
    Webhook {
        /// HTTP client for the dispatch call.
        client: reqwest::Client,
        /// Full URL of the webhook refresh endpoint.
        endpoint: String,
        /// Shared secret sent as a bearer credential.
        secret: String,
    },
}

impl RefreshDispatcher {
    /// Builds an in-process dispatcher around the refresh service.
    #[must_use]
    pub fn in_process(refresh: Arc<AppRefreshService>) -> Self {
        Self::InProcess { refresh }
    }

    /// Builds a webhook dispatcher targeting this deployment's own refresh
    /// endpoint.
    #[must_use]
    pub fn webhook(client: reqwest::Client, base_url: &str, secret: String) -> Self {
        Self::Webhook {
            client,
            endpoint: format!("{}/api/v1/webhook/fetch-data", base_url.trim_end_matches('/')),
            secret,
        }
    }

    /// Kicks off a refresh for a city, fire-and-forget.
    ///
    /// Returns immediately; any failure of the spawned work is logged and
    /// never reaches the read path that triggered it.
    pub fn dispatch(&self, location_id: i64, location_name: &str) {
        match self {
            Self::InProcess { refresh } => {
                let refresh = Arc::clone(refresh);
                let location_name = location_name.to_string();
                tokio::spawn(async move {
                    if let Err(error) = refresh.refresh_city(location_id, &location_name).await {
                        tracing::error!(
                            location_id,
                            %location_name,
                            %error,
                            "background refresh failed"
                        );
                    }
                });
            }
            Self::Webhook {
                client,
                endpoint,
                secret,
            } => {
                let client = client.clone();
                let endpoint = endpoint.clone();
                let secret = secret.clone();
                let location_name = location_name.to_string();
                tracing::info!(location_id, %location_name, "dispatching refresh via webhook");
                tokio::spawn(async move {
                    let result = client
                        .post(&endpoint)
                        .bearer_auth(&secret)
                        .json(&json!({
                            "cityId": location_id.to_string(),
                            "cityName": location_name,
                        }))
                        .send()
                        .await;
                    match result {
                        Ok(response) if !response.status().is_success() => {
                            tracing::error!(
                                location_id,
                                status = response.status().as_u16(),
                                "webhook refresh dispatch rejected"
                            );
                        }
                        Ok(_) => {}
                        Err(error) => {
                            tracing::error!(location_id, %error, "webhook refresh dispatch failed");
                        }
                    }
                });
            }
        }
    }

    /// Returns the mode this dispatcher runs in.
    #[must_use]
    pub const fn mode(&self) -> DispatchMode {
        match self {
            Self::InProcess { .. } => DispatchMode::InProcess,
            Self::Webhook { .. } => DispatchMode::Webhook,
        }
    }
}
