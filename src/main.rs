//! Offline Gateway - An offline-first HTTP caching gateway
//!
//! Fronts an origin server with versioned cache generations, cache-first
//! and network-first fetch strategies, and synthesized offline responses.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use offline_gateway::api::{create_router, AppState};
use offline_gateway::boundary::InterceptionBoundary;
use offline_gateway::cache::{CacheStore, FileStore, MemoryStore, SystemClock};
use offline_gateway::config::Config;
use offline_gateway::net::HttpClientBoundary;

/// Main entry point for the Offline Gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the cache store (persistent when a directory is available)
/// 4. Wire the interception boundary and its control queue
/// 5. Run install, then activate (install requests skip-waiting)
/// 6. Start the HTTP server on the configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "offline_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Offline Gateway");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: version={}, origin={}, port={}",
        config.cache_version, config.origin_url, config.server_port
    );

    let origin = Url::parse(&config.origin_url).context("ORIGIN_URL is not a valid URL")?;

    // Persistent store when a directory is available, memory otherwise
    let store: Arc<dyn CacheStore> = match config.cache_dir.clone().or_else(FileStore::default_dir)
    {
        Some(dir) => {
            info!("Using persistent cache at {}", dir.display());
            Arc::new(FileStore::new(dir))
        }
        None => {
            warn!("No cache directory available, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let (boundary, control_task) = InterceptionBoundary::wire(
        store,
        Arc::new(HttpClientBoundary::new()),
        Arc::new(SystemClock),
        origin.clone(),
        &config.cache_version,
    );

    // A failed install must block activation: the generation would be
    // missing part of its critical resource set.
    boundary
        .on_install()
        .await
        .context("installation failed; the new generation was not activated")?;
    if boundary.lifecycle().skip_waiting_requested() {
        boundary.on_activate().await.context("activation failed")?;
    }

    let state = AppState::new(Arc::new(boundary), origin);
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Gateway listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(control_task))
        .await
        .context("server error")?;

    info!("Gateway shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the control queue task and allows graceful shutdown.
async fn shutdown_signal(control_task: JoinHandle<()>) {
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

    // Abort the control queue task
    control_task.abort();
    warn!("Control queue task aborted");
}
