//! A computed ticket mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::history::NewHistoryEntry;
use super::priority::Priority;
use super::status::TicketStatus;

/// Full post-update workflow state of one ticket plus the history entry
/// to append, if any.
///
/// Stores apply it atomically: the row is written only if its version
/// still equals `expected_version`, and the history entry is written in
/// the same unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketChange {
    pub ticket_id: i64,
    pub expected_version: i32,
    pub status_id: TicketStatus,
    pub priority_id: Priority,
    pub assigned_to: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub updated_by: i64,
    pub updated_at: DateTime<Utc>,
    pub history: Option<NewHistoryEntry>,
}
