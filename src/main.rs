//! Helpdesk server
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use helpdesk_core::config::AppConfig;
use helpdesk_core::error::AppError;
use helpdesk_database::{DatabasePool, Stores};
use helpdesk_storage::providers::local::LocalStorageProvider;

#[tokio::main]
async fn main() {
    let env = std::env::var("HELPDESK_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
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
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting helpdesk");

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    helpdesk_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");
    let stores = Stores::postgres(db.pool().clone());

    // ── Step 2: Attachment storage ───────────────────────────────
    let storage = LocalStorageProvider::new(&config.attachments.root_path).await?;
    tracing::info!(root = %config.attachments.root_path, "Attachment storage ready");

    // ── Step 3: HTTP server ──────────────────────────────────────
    let result = helpdesk_api::run_server(config, stores, Arc::new(storage)).await;

    db.close().await;
    result
}
