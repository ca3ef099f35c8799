//! # helpdesk-auth
//!
//! Authentication and authorization for the helpdesk.
//!
//! ## Modules
//!
//! - `jwt` issues and validates bearer tokens
//! - `password` hashes and verifies passwords with Argon2id
//! - `identity` resolves a bearer credential to an [`Identity`]
//! - `rbac` holds the role permission matrix and the per-operation guards

pub mod credential;
pub mod identity;
pub mod jwt;
pub mod password;
pub mod rbac;

pub use credential::CredentialError;
pub use identity::{Identity, IdentityResolver};
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
pub use rbac::{Permission, RbacEnforcer, RbacPolicies};
