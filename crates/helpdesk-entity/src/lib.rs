//! # helpdesk-entity
//!
//! Domain entity models for the helpdesk. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod attachment;
pub mod company;
pub mod reference;
pub mod ticket;
pub mod user;
