//! Attachment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Metadata row for a stored attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Attachment {
    /// Unique attachment identifier.
    pub id: i64,
    /// Owning ticket.
    pub ticket_id: i64,
    /// Original client file name.
    pub file_name: String,
    /// Key in the attachment byte store.
    #[serde(skip_serializing)]
    pub storage_key: String,
    /// Payload size.
    pub size_bytes: i64,
    /// Declared content type, truncated before persistence.
    pub mime_type: Option<String>,
    /// Uploader.
    pub uploaded_by: i64,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
}

/// Data required to record an uploaded attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAttachment {
    pub ticket_id: i64,
    pub file_name: String,
    pub storage_key: String,
    pub size_bytes: i64,
    pub mime_type: Option<String>,
    pub uploaded_by: i64,
}
