//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::Role;

/// A user row joined with its role label.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Display name.
    pub full_name: String,
    /// Unique login name, compared case-sensitively.
    pub username: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Foreign key into `roles`.
    pub role_id: i32,
    /// Stored role label, e.g. `"Destek"`.
    pub role_label: String,
    /// Company membership; set for customers.
    pub company_id: Option<i64>,
    /// Inactive users cannot authenticate.
    pub is_active: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Canonical role derived from the stored label.
    pub fn role(&self) -> Role {
        Role::from_label(&self.role_label)
    }

    /// Public view without credentials.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            full_name: self.full_name.clone(),
            username: self.username.clone(),
            role: self.role(),
            company_id: self.company_id,
        }
    }
}

/// User as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    pub role: Role,
    pub company_id: Option<i64>,
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Display name.
    pub full_name: String,
    /// Login name.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Role to assign.
    pub role: Role,
    /// Company membership.
    pub company_id: Option<i64>,
}
