//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Value of the `iss` claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Access token lifetime in hours.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
    /// Minimum password length for new users.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Password for an initial `admin` account created at startup when no
    /// admin exists yet. Unset disables bootstrapping.
    #[serde(default)]
    pub bootstrap_admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            issuer: default_issuer(),
            token_ttl_hours: default_token_ttl(),
            password_min_length: default_password_min(),
            bootstrap_admin_password: None,
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_issuer() -> String {
    "helpdesk".to_string()
}

fn default_token_ttl() -> u64 {
    24
}

fn default_password_min() -> usize {
    8
}
