//! live-odds entry point.
//!
//! Loads the first snapshot, opens the live channel, and serves the read
//! API until Ctrl+C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use live_odds::api;
use live_odds::app_state::AppState;
use live_odds::config::FeedConfig;
use live_odds::store::EventStore;
use live_odds::transport::{HttpSnapshotSource, WsChannelTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = FeedConfig::from_env().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    tracing::info!(
        addr = %config.listen_addr,
        http_base = %config.http_base,
        ws_base = %config.ws_base,
        "starting live-odds"
    );

    // Build transport adapters
    let snapshots = HttpSnapshotSource::new(&config.http_base, config.fetch_timeout)
        .context("building snapshot client")?;
    let transport = WsChannelTransport::new(&config.ws_base, config.channel_buffer);

    // Build the store
    let store = EventStore::new(
        Arc::new(snapshots),
        Arc::new(transport),
        config.store_options(),
    );

    // Initial snapshot; a failure is recorded in the store and the live
    // channel still opens.
    if let Err(e) = store.load_snapshot().await {
        tracing::warn!(error = %e, "initial snapshot failed; serving empty table");
    }
    let scope = config.channel_scope();
    store.connect(scope);

    // Build router
    let app_state = AppState {
        store: store.clone(),
        default_scope: scope,
    };
    let app = api::build_router().with_state(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(30)))
            .layer(CorsLayer::permissive()),
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.disconnect();
    tracing::info!("live-odds stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}
