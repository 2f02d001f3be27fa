//! Customer Ledger - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # PostgreSQL at the default URL
//! cargo run --bin ledger-api
//!
//! # No database, data lives in process memory
//! API_STORAGE=memory API_PORT=3000 cargo run --bin ledger-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_STORAGE` - `postgres` or `memory` (default: postgres)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_MAX_CONNECTIONS` - Pool size (default: 10)
//! * `API_LOG_LEVEL` - `EnvFilter` directive (default: info); `RUST_LOG` wins when set
//! * `API_LOG_FORMAT` - `pretty` or `json` (default: pretty)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::SystemClock;
use domain_ledger::{InMemoryLedgerStore, LedgerStore};
use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedgerAdapter};
use interface_api::config::{ApiConfig, LogFormat, StorageBackend};
use interface_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API configuration")?;

    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        storage = ?config.storage,
        "Starting Customer Ledger API Server"
    );

    let store = open_store(&config).await?;
    let state = AppState::new(store, Arc::new(SystemClock), config.clone());
    let app = create_router(state);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

async fn open_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn LedgerStore>> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on exit");
            Ok(Arc::new(InMemoryLedgerStore::new()))
        }
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db_config = DatabaseConfig::new(&config.database_url)
                .max_connections(config.max_connections);
            let pool = create_pool(db_config)
                .await
                .context("failed to connect to database")?;

            tracing::info!("Running database migrations...");
            run_migrations(&pool).await.context("failed to run migrations")?;

            tracing::info!("Database ready");
            Ok(Arc::new(PostgresLedgerAdapter::new(pool)))
        }
    }
}

/// Waits for Ctrl+C or SIGTERM so in-flight requests can finish
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
