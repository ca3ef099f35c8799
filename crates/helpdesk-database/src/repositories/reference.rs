//! Lookup-table repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use helpdesk_core::error::{AppError, ErrorKind};
use helpdesk_core::result::AppResult;
use helpdesk_entity::reference::LookupEntry;

use super::db_error;
use crate::store::ReferenceStore;

/// Repository for modules, statuses and priorities.
#[derive(Debug, Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    /// Create a new reference repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceStore for ReferenceRepository {
    async fn modules(&self) -> AppResult<Vec<LookupEntry>> {
        sqlx::query_as::<_, LookupEntry>("SELECT id, name, description FROM modules ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list modules"))
    }

    async fn statuses(&self) -> AppResult<Vec<LookupEntry>> {
        sqlx::query_as::<_, LookupEntry>("SELECT id, name, description FROM statuses ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list statuses"))
    }

    async fn priorities(&self) -> AppResult<Vec<LookupEntry>> {
        sqlx::query_as::<_, LookupEntry>(
            "SELECT id, name, description FROM priorities ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list priorities"))
    }

    async fn module_exists(&self, id: i32) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM modules WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to check module"))
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| {
                AppError::with_source(ErrorKind::ServiceUnavailable, "Database unreachable", e)
            })
    }
}
