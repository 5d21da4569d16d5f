//! pulse-gateway server entry point.
//!
//! Starts the Axum HTTP server, wires the store, providers, freshness
//! tracker, and refresh dispatcher, and spawns the past-event sweeper.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pulse_gateway::api;
use pulse_gateway::app_state::AppState;
use pulse_gateway::config::GatewayConfig;
use pulse_gateway::persistence::PgEventStore;
use pulse_gateway::providers::edmtrain::EdmtrainConfig;
use pulse_gateway::providers::ticketmaster::TicketmasterConfig;
use pulse_gateway::providers::HttpEventSources;
use pulse_gateway::service::dispatch::{DispatchMode, RefreshDispatcher};
use pulse_gateway::service::{cleanup, FreshnessTracker, RefreshService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting pulse-gateway");

    // Connect the database and apply migrations
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let store = Arc::new(PgEventStore::new(pool));

    // Provider clients
    let sources = Arc::new(HttpEventSources::new(
        EdmtrainConfig {
            api_key: config.edmtrain_api_key.clone(),
            base_url: config.edmtrain_api_url.clone(),
        },
        TicketmasterConfig {
            api_key: config.ticketmaster_api_key.clone(),
            base_url: config.ticketmaster_api_url.clone(),
        },
    )?);

    // Service layer
    let freshness = FreshnessTracker::new(Arc::clone(&store), config.cache_ttl_hours);
    let refresh = Arc::new(RefreshService::new(
        Arc::clone(&store),
        sources,
        freshness.clone(),
    ));
    let dispatcher = Arc::new(match config.dispatch_mode {
        DispatchMode::InProcess => RefreshDispatcher::in_process(Arc::clone(&refresh)),
        DispatchMode::Webhook => RefreshDispatcher::webhook(
            reqwest::Client::new(),
            &config.webhook_base_url,
            config.webhook_secret.clone(),
        ),
    });
    tracing::info!(mode = ?dispatcher.mode(), ttl_hours = config.cache_ttl_hours, "refresh dispatch configured");

    // Past-event sweeper
    let _sweeper = cleanup::spawn_sweeper(
        Arc::clone(&store),
        Duration::from_secs(config.cleanup_interval_secs),
    );

    // Build application state
    let app_state = AppState {
        store,
        freshness,
        dispatcher,
        refresh,
        webhook_secret: config.webhook_secret.clone(),
    };

    // Build router
    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
