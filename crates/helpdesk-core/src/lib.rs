//! # helpdesk-core
//!
//! Core crate for the helpdesk. Contains configuration schemas, the
//! attachment storage trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other helpdesk crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind, FieldViolation};
pub use result::AppResult;
