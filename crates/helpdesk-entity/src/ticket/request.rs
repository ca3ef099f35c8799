//! Caller intents for creating and updating tickets, after parsing and
//! before authorization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::priority::Priority;
use super::status::TicketStatus;

/// Requested ticket creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketDraft {
    /// Owning company; forced to the caller's company for customers.
    pub company_id: Option<i64>,
    pub module_id: i32,
    pub subject: String,
    pub description: String,
    pub mail_content: Option<String>,
    pub email: Option<String>,
    pub priority_id: Priority,
    /// Ignored for customers.
    pub assigned_to: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Requested ticket update. `None` keeps the current value.
///
/// `assigned_to` and `due_date` are tri-state: `Some(None)` clears the
/// field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketUpdate {
    pub status_id: Option<TicketStatus>,
    pub priority_id: Option<Priority>,
    pub assigned_to: Option<Option<i64>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub notes: Option<String>,
}
