//! Bearer credential to caller identity.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use helpdesk_core::result::AppResult;
use helpdesk_database::store::UserStore;
use helpdesk_entity::user::{Role, User};

use crate::credential::CredentialError;
use crate::jwt::JwtDecoder;

/// Who is calling. Derived per request; never taken from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
    pub company_id: Option<i64>,
}

impl Identity {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role(),
            company_id: user.company_id,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, CredentialError> {
    let value = header.ok_or(CredentialError::Missing)?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(CredentialError::Malformed)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(CredentialError::Malformed);
    }
    Ok(token)
}

/// Resolves bearer credentials against the user store.
///
/// The role comes from the stored role label on every call, so role
/// changes and deactivations take effect without re-issuing tokens.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    decoder: JwtDecoder,
    users: Arc<dyn UserStore>,
}

impl IdentityResolver {
    pub fn new(decoder: JwtDecoder, users: Arc<dyn UserStore>) -> Self {
        Self { decoder, users }
    }

    /// Resolve the raw `Authorization` header value to an identity.
    pub async fn resolve(&self, header: Option<&str>) -> AppResult<Identity> {
        let user = self.resolve_user(header).await?;
        Ok(Identity::from_user(&user))
    }

    /// Resolve the raw `Authorization` header value to the active user.
    pub async fn resolve_user(&self, header: Option<&str>) -> AppResult<User> {
        let token = bearer_token(header)?;
        let claims = self.decoder.decode(token)?;
        let Some(user) = self.users.find_active(claims.user_id()).await? else {
            debug!(user_id = claims.user_id(), "Token subject is unknown or inactive");
            return Err(CredentialError::UnknownUser.into());
        };
        Ok(user)
    }
}
