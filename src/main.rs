//! Tiercache - A two-tier key/value cache server
//!
//! Keeps hot entries in memory, demotes cooling entries to durable storage,
//! and promotes them back on read.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiercache::api::create_router;
use tiercache::cache::TieredCache;
use tiercache::{AppState, Config};

/// Main entry point for the tiercache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the file-backed secondary store and the cache engine
/// 4. Start the background janitor (part of engine construction)
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiercache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tiercache server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: expire_ttl={}s, transfer_ttl={}s, sweep_interval={}s, port={}, data_dir={}",
        config.default_expire_ttl,
        config.default_transfer_ttl,
        config.sweep_interval,
        config.server_port,
        config.data_dir
    );

    // Create application state; the janitor starts with the engine
    let state = AppState::from_config(&config).context("failed to initialize cache engine")?;
    info!("Cache engine initialized");

    // Keep a handle for shutdown before the router takes the state
    let cache = state.cache.clone();
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cache))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, stops the janitor before the server drains.
async fn shutdown_signal(cache: TieredCache) {
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // No sweep starts after this returns
    cache.shutdown().await;
}
