//! Typed credential failures.

use thiserror::Error;

use helpdesk_core::error::AppError;

/// Why a bearer credential did not resolve to an identity.
///
/// `Missing` and `Malformed` are the "unauthenticated" cases; the others
/// mean the credential was readable but is not valid for an active user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("Authorization header is missing")]
    Missing,
    #[error("Authorization header must be 'Bearer <token>'")]
    Malformed,
    #[error("Token has expired")]
    Expired,
    #[error("Token is invalid")]
    Invalid,
    #[error("Token does not belong to an active user")]
    UnknownUser,
    #[error("Invalid username or password")]
    BadLogin,
}

impl CredentialError {
    /// Whether the request carried no usable credential at all.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Missing | Self::Malformed)
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        AppError::unauthenticated(err.to_string())
    }
}
