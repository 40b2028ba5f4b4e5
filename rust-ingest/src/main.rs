//! Spotlight webhook ingestion server.
//!
//! Binds the webhook receiver: loads configuration, decodes the signing
//! secret, selects the user store, and serves until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spotlight::store::{ConvexStore, MemoryStore, UserStore};
use spotlight::web::{app, AppState};
use spotlight::{Config, SigningSecret};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("ingest_server_starting");

    // Load configuration; the signing secret is required
    let config = Config::from_env().context("Failed to load configuration")?;

    // A malformed secret fails startup, not the first delivery
    let secret = SigningSecret::new(&config.webhook_secret)
        .context("CLERK_WEBHOOK_SECRET is not a valid signing secret")?;

    info!(
        port = config.port,
        tolerance_secs = config.webhook_tolerance_secs,
        convex_configured = config.convex_url.is_some(),
        "config_loaded"
    );

    // Select the user store
    let store: Arc<dyn UserStore> = match &config.convex_url {
        Some(url) => {
            let store =
                ConvexStore::new(url, Duration::from_millis(config.request_timeout_ms))
                    .context("Failed to create Convex client")?;
            info!(deployment = %url, "convex_store_created");
            Arc::new(store)
        }
        None => {
            warn!("convex_url_not_configured_using_memory_store");
            Arc::new(MemoryStore::default())
        }
    };

    // Create application state and router
    let state = AppState::new(config.clone(), secret, store);
    let router = app(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "ingest_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("ingest_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("ingest_server_shutting_down");
}
