//! duoroom server: ephemeral two-person chat and file rooms.
//!
//! Main entry point that wires all crates together and starts the server.

use std::future::IntoFuture;
use std::pin::pin;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing_subscriber::{EnvFilter, fmt};

use duoroom_core::config::AppConfig;
use duoroom_core::error::AppError;
use duoroom_database::Stores;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("DUOROOM_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting duoroom v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stores (rooms, history, file index) ──────────────
    tracing::info!(backend = ?config.database.backend, "Opening stores...");
    let stores = Stores::from_config(&config.database).await?;

    // ── Step 2: Object storage ───────────────────────────────────
    tracing::info!(provider = ?config.storage.provider, "Initializing object storage...");
    let storage = duoroom_storage::build_storage(&config.storage).await?;

    // ── Step 3: Room registry + realtime engine ──────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = duoroom_api::build_state(config, stores.clone(), storage);
    let realtime = state.realtime.clone();
    realtime.resume_seats().await?;

    // ── Step 4: Build and start HTTP server ──────────────────────
    let app = duoroom_api::build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("duoroom server listening on {}", addr);

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        // Live sockets would otherwise hold the server open.
        realtime.shutdown();
        let _ = signalled_tx.send(());
    });

    let mut server = pin!(server.into_future());
    let served = tokio::select! {
        result = &mut server => result,
        _ = signalled_rx => match tokio::time::timeout(grace, &mut server).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out");
                Ok(())
            }
        },
    };
    let served = served.map_err(|e| AppError::internal(format!("Server error: {e}")));

    // ── Step 5: Cleanup ──────────────────────────────────────────
    stores.close().await;
    tracing::info!("duoroom server stopped");

    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
