//! parley-server – entry point.
//!
//! Startup order:
//! 1. Load `.env` (if present) and parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON in production, pretty in dev).
//! 3. Open the flat-file record store, creating the data directory if needed.
//! 4. Build a lazy Postgres pool for the external chat-history table.
//! 5. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod db;
mod error;
mod forward;
mod middleware;
mod routes;
mod schemas;
mod session;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::db::HistoryReader;
use crate::forward::WebhookForwarder;
use crate::session::SessionManager;
use crate::state::AppState;
use crate::store::FileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    dotenvy::dotenv().ok();
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    // Build the log-level filter, warning loudly if the configured value is
    // not a valid tracing filter expression.
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: PARLEY_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "parley-server starting");

    // ── 3. Record store ────────────────────────────────────────────────────────
    let records = FileStore::open(&cfg.data_dir).await?;
    info!(data_dir = %cfg.data_dir, "record store ready");

    // ── 4. Chat-history database ───────────────────────────────────────────────
    // Lazy pool: the server starts even when Postgres is down, and connection
    // errors surface per-request on the history endpoint instead.
    let history = HistoryReader::connect_lazy(&cfg.database_url)?;
    if !history.ping().await {
        warn!("chat-history database is unreachable; history reads will fail until it comes back");
    }

    // ── 5. Shared application state ────────────────────────────────────────────
    let forwarder = WebhookForwarder::new(Duration::from_secs(cfg.webhook_timeout_secs))?;
    let sessions = SessionManager::new(&cfg.secret_key);
    let state = Arc::new(AppState {
        config: Arc::new(cfg.clone()),
        records: Arc::new(records),
        history: Arc::new(history),
        forwarder: Arc::new(forwarder),
        sessions,
    });

    // ── 6. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("parley-server stopped");
    Ok(())
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c   => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
