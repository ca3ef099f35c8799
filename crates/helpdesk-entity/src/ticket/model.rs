//! Ticket entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::history::StatusHistoryEntry;
use super::priority::Priority;
use super::status::TicketStatus;

/// A support request.
///
/// Soft-deleted tickets keep their row with `is_active = false`; every
/// read path filters them out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    /// Store-assigned identifier.
    pub id: i64,
    /// Owning company.
    pub company_id: i64,
    /// Software module the request concerns.
    pub module_id: i32,
    /// Short summary.
    pub subject: String,
    /// Internal technical description.
    pub description: String,
    /// Raw text supplied by the customer.
    pub mail_content: Option<String>,
    /// Contact address.
    pub email: Option<String>,
    /// Current lifecycle state.
    pub status_id: TicketStatus,
    /// Current priority.
    pub priority_id: Priority,
    /// Support user working on the ticket.
    pub assigned_to: Option<i64>,
    /// Creator.
    pub created_by: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last editor.
    pub updated_by: Option<i64>,
    /// Last edit time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Optional deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Set while the status is a closing state.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Soft-delete flag.
    pub is_active: bool,
    /// Incremented on every mutation; used for compare-and-swap updates.
    pub version: i32,
}

/// Ticket with its status history, as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub status_name: String,
    pub priority_name: String,
    /// Oldest entry first.
    pub status_history: Vec<StatusHistoryEntry>,
}

impl TicketDetail {
    pub fn new(ticket: Ticket, status_history: Vec<StatusHistoryEntry>) -> Self {
        Self {
            status_name: ticket.status_id.label().to_string(),
            priority_name: ticket.priority_id.label().to_string(),
            ticket,
            status_history,
        }
    }
}

/// Data required to insert a ticket. The status is always `New`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTicket {
    pub company_id: i64,
    pub module_id: i32,
    pub subject: String,
    pub description: String,
    pub mail_content: Option<String>,
    pub email: Option<String>,
    pub priority_id: Priority,
    pub assigned_to: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_by: i64,
}
