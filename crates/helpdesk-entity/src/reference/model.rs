//! Lookup row shared by modules, statuses and priorities.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// `{id, name, description?}` row of a reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LookupEntry {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl LookupEntry {
    pub fn new(id: i32, name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.map(str::to_string),
        }
    }
}
