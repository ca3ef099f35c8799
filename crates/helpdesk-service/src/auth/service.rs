//! Login, token verification and first-admin bootstrap.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use helpdesk_auth::jwt::IssuedToken;
use helpdesk_auth::{CredentialError, IdentityResolver, JwtEncoder, PasswordHasher};
use helpdesk_core::error::ErrorKind;
use helpdesk_core::result::AppResult;
use helpdesk_database::store::UserStore;
use helpdesk_entity::user::{CreateUser, Role, User, UserProfile};

/// Username of the bootstrap administrator.
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";

/// Result of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    pub token: IssuedToken,
    pub user: UserProfile,
}

/// Handles credential checks and token issuance.
#[derive(Debug, Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
    encoder: Arc<JwtEncoder>,
    resolver: Arc<IdentityResolver>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
        resolver: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            users,
            hasher,
            encoder,
            resolver,
        }
    }

    /// Verify a username and password and issue an access token.
    ///
    /// Unknown usernames, inactive users and wrong passwords all fail the
    /// same way.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResult> {
        let Some(user) = self.users.find_by_username(username).await? else {
            self.hasher.verify_dummy(password);
            warn!(username, "Login failed: unknown username");
            return Err(CredentialError::BadLogin.into());
        };

        let valid = self.hasher.verify_password(password, &user.password_hash)?;
        if !valid || !user.is_active {
            warn!(user_id = user.id, active = user.is_active, "Login failed");
            return Err(CredentialError::BadLogin.into());
        }

        let token = self.encoder.issue(&user)?;
        info!(user_id = user.id, role = %user.role(), "Login successful");
        Ok(LoginResult {
            token,
            user: user.profile(),
        })
    }

    /// Resolve the raw `Authorization` header to the caller's profile.
    pub async fn verify(&self, authorization: Option<&str>) -> AppResult<UserProfile> {
        let user = self.resolver.resolve_user(authorization).await?;
        Ok(user.profile())
    }

    /// Create the `admin` user when no active admin exists.
    ///
    /// Returns the created user, or `None` when nothing had to be done.
    pub async fn bootstrap_admin(&self, password: &str) -> AppResult<Option<User>> {
        if self.users.admin_exists().await? {
            return Ok(None);
        }

        let password_hash = self.hasher.hash_password(password)?;
        let created = self
            .users
            .create(CreateUser {
                full_name: "System Administrator".to_string(),
                username: BOOTSTRAP_ADMIN_USERNAME.to_string(),
                password_hash,
                role: Role::Admin,
                company_id: None,
            })
            .await;

        match created {
            Ok(user) => {
                info!(user_id = user.id, "Bootstrap admin created");
                Ok(Some(user))
            }
            Err(e) if e.kind == ErrorKind::Conflict => {
                warn!(
                    username = BOOTSTRAP_ADMIN_USERNAME,
                    "No active admin exists but the bootstrap username is taken"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
