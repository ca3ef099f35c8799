//! Canonical user roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three canonical roles.
///
/// Stored role labels are free text and locale specific; they are mapped
/// onto this enum with [`Role::from_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Unrestricted staff.
    Admin,
    /// Staff working on tickets assigned to them.
    Support,
    /// Member of a client company.
    Customer,
}

/// Labels seeded in the `roles` table. Anything else resolves to
/// [`Role::Customer`].
const LABELS: &[(&str, Role)] = &[
    ("Admin", Role::Admin),
    ("Destek", Role::Support),
    ("Müşteri", Role::Customer),
];

impl Role {
    /// Map a stored role label to a canonical role.
    ///
    /// Total: an unknown label yields the least privileged role,
    /// [`Role::Customer`].
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        LABELS
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, role)| *role)
            .unwrap_or(Self::Customer)
    }

    /// Label this role is seeded with in the `roles` table.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Support => "Destek",
            Self::Customer => "Müşteri",
        }
    }

    /// Seeded primary key of this role in the `roles` table.
    pub fn id(&self) -> i32 {
        match self {
            Self::Admin => 1,
            Self::Support => 2,
            Self::Customer => 3,
        }
    }

    /// Inverse of [`Role::id`].
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Admin),
            2 => Some(Self::Support),
            3 => Some(Self::Customer),
            _ => None,
        }
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Support => "support",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = helpdesk_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "support" => Ok(Self::Support),
            "customer" => Ok(Self::Customer),
            _ => Err(helpdesk_core::AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: admin, support, customer"
            ))),
        }
    }
}
