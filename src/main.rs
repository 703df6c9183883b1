//! Query Cacher - HTTP front end for a cached in-memory data source

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use query_cacher::api::{create_router, AppState};
use query_cacher::{spawn_cleanup_task, Config, MemorySource};

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Load the data source fixtures, if any
/// 4. Create the store and start the expiry sweep
/// 5. Serve the router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info", overridable with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "query_cacher=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Query Cacher");

    let config = Config::from_env();
    info!(
        prefix = %config.cache_prefix,
        ttl_secs = config.cache_ttl,
        max_entries = config.max_entries,
        port = config.server_port,
        cleanup_interval_secs = config.cleanup_interval,
        "Configuration loaded"
    );

    let source = match &config.fixtures_path {
        Some(path) => load_fixtures(path).await?,
        None => MemorySource::new(),
    };
    info!(entities = ?source.entities(), "Data source ready");

    let state = AppState::from_config(&config, source);
    let cleanup_handle = spawn_cleanup_task(state.store.keyspace(), config.cleanup_interval);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn load_fixtures(path: &Path) -> anyhow::Result<MemorySource> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read fixtures from {}", path.display()))?;
    let fixtures = serde_json::from_str(&text)
        .with_context(|| format!("fixtures in {} are not valid JSON", path.display()))?;

    MemorySource::from_json(fixtures).context("invalid fixtures")
}

/// Waits for Ctrl+C or SIGTERM, then stops the expiry sweep.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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

    cleanup_handle.abort();
    warn!("Expiry sweep aborted");
}
