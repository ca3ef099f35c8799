//! Ticket status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

use helpdesk_core::AppError;

/// Lifecycle states, ordered by their seeded ids.
///
/// Serialized as the integer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(into = "i32", try_from = "i32")]
#[repr(i32)]
pub enum TicketStatus {
    New = 1,
    Assigned = 2,
    InProgress = 3,
    Test = 4,
    TestFailed = 5,
    Completed = 6,
    Waiting = 7,
    Closed = 8,
}

impl TicketStatus {
    /// All statuses in id order.
    pub const ALL: [TicketStatus; 8] = [
        Self::New,
        Self::Assigned,
        Self::InProgress,
        Self::Test,
        Self::TestFailed,
        Self::Completed,
        Self::Waiting,
        Self::Closed,
    ];

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    /// `Completed` and `Closed` stamp `resolved_at`.
    pub fn is_closing(self) -> bool {
        matches!(self, Self::Completed | Self::Closed)
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Assigned => "Assigned",
            Self::InProgress => "In Progress",
            Self::Test => "Test",
            Self::TestFailed => "Test Failed",
            Self::Completed => "Completed",
            Self::Waiting => "Waiting",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<TicketStatus> for i32 {
    fn from(status: TicketStatus) -> Self {
        status.id()
    }
}

impl TryFrom<i32> for TicketStatus {
    type Error = AppError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        Self::from_id(id).ok_or_else(|| AppError::validation(format!("Unknown status id {id}")))
    }
}
