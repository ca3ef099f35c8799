//! Company entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A client company. Tickets and customer users reference it by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Company listing row with usage counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CompanySummary {
    pub id: i64,
    pub name: String,
    /// Active customer users in the company.
    pub customer_count: i64,
    /// Active tickets owned by the company.
    pub ticket_count: i64,
}

/// Data required to create a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    pub name: String,
}

/// Mutable company fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCompany {
    pub name: String,
}
