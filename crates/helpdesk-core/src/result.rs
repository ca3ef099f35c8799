//! Convenience result alias.

use crate::error::AppError;

/// Result type used by every helpdesk crate.
pub type AppResult<T> = Result<T, AppError>;
