//! Schema migrations embedded from the workspace `migrations/` directory.

use sqlx::PgPool;
use tracing::info;

use helpdesk_core::error::{AppError, ErrorKind};

/// Apply every pending migration, including the reference-data seeds.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Applying schema migrations");

    let migrator = sqlx::migrate!("../../migrations");
    migrator.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!(
        applied = migrator.iter().count(),
        "Schema migrations up to date"
    );
    Ok(())
}
