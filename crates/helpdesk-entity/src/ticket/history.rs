//! Status history entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::TicketStatus;

/// Append-only audit record. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub ticket_id: i64,
    /// Status in effect after the recorded change.
    pub status_id: TicketStatus,
    /// Actor.
    pub user_id: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// History entry to be written together with a ticket mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub status_id: TicketStatus,
    pub user_id: i64,
    pub notes: Option<String>,
}
