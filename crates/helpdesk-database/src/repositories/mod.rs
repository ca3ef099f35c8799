//! PostgreSQL implementations of the store traits.

pub mod attachment;
pub mod company;
pub mod reference;
pub mod ticket;
pub mod user;

pub use attachment::AttachmentRepository;
pub use company::CompanyRepository;
pub use reference::ReferenceRepository;
pub use ticket::TicketRepository;
pub use user::UserRepository;

use helpdesk_core::error::{AppError, ErrorKind};

/// Wrap a sqlx error with context.
///
/// Foreign-key violations become validation errors; everything else is a
/// database failure.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::with_source(
                ErrorKind::Validation,
                format!("{context}: referenced record does not exist"),
                e,
            )
        }
        sqlx::Error::PoolTimedOut => {
            AppError::with_source(ErrorKind::ServiceUnavailable, context, e)
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}
