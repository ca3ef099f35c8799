//! Attachment metadata repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use helpdesk_core::result::AppResult;
use helpdesk_entity::attachment::{Attachment, NewAttachment};

use super::db_error;
use crate::store::AttachmentStore;

/// Repository for `ticket_files` rows.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttachmentStore for AttachmentRepository {
    async fn create(&self, attachment: NewAttachment) -> AppResult<Attachment> {
        sqlx::query_as::<_, Attachment>(
            "INSERT INTO ticket_files (ticket_id, file_name, storage_key, size_bytes, \
             mime_type, uploaded_by) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(attachment.ticket_id)
        .bind(&attachment.file_name)
        .bind(&attachment.storage_key)
        .bind(attachment.size_bytes)
        .bind(&attachment.mime_type)
        .bind(attachment.uploaded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to record attachment"))
    }

    async fn list_by_ticket(&self, ticket_id: i64) -> AppResult<Vec<Attachment>> {
        sqlx::query_as::<_, Attachment>(
            "SELECT * FROM ticket_files WHERE ticket_id = $1 ORDER BY uploaded_at DESC, id DESC",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list attachments"))
    }

    async fn find(&self, id: i64) -> AppResult<Option<Attachment>> {
        sqlx::query_as::<_, Attachment>("SELECT * FROM ticket_files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find attachment"))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM ticket_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete attachment"))?;
        Ok(result.rows_affected() > 0)
    }
}
