//! Ticket priority enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

use helpdesk_core::AppError;

/// Ticket priority, serialized as the integer id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(into = "i32", try_from = "i32")]
#[repr(i32)]
pub enum Priority {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Priority> for i32 {
    fn from(priority: Priority) -> Self {
        priority.id()
    }
}

impl TryFrom<i32> for Priority {
    type Error = AppError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        Self::from_id(id).ok_or_else(|| AppError::validation(format!("Unknown priority id {id}")))
    }
}
