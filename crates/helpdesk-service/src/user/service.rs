//! Admin user management and the support-user picker.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use helpdesk_auth::{Permission, PasswordHasher, RbacEnforcer};
use helpdesk_core::error::{AppError, FieldViolation};
use helpdesk_core::result::AppResult;
use helpdesk_database::store::{CompanyStore, UserStore};
use helpdesk_entity::user::{CreateUser, Role, UserProfile};

use crate::context::RequestContext;

/// Request to create a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserRequest {
    pub full_name: String,
    pub username: String,
    pub password: String,
    /// 1 admin, 2 support, 3 customer.
    pub role_id: i32,
    /// Required for customers.
    pub company_id: Option<i64>,
}

/// Handles user listing and creation.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    companies: Arc<dyn CompanyStore>,
    hasher: Arc<PasswordHasher>,
    rbac: Arc<RbacEnforcer>,
    password_min_length: usize,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        users: Arc<dyn UserStore>,
        companies: Arc<dyn CompanyStore>,
        hasher: Arc<PasswordHasher>,
        rbac: Arc<RbacEnforcer>,
        password_min_length: usize,
    ) -> Self {
        Self {
            users,
            companies,
            hasher,
            rbac,
            password_min_length,
        }
    }

    /// All active users (admin).
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<UserProfile>> {
        self.rbac.require(&ctx.identity, Permission::ManageUsers)?;
        let users = self.users.list_active().await?;
        Ok(users.iter().map(|u| u.profile()).collect())
    }

    /// Active support users, for the assignment picker.
    pub async fn list_support(&self, ctx: &RequestContext) -> AppResult<Vec<UserProfile>> {
        self.rbac.require(&ctx.identity, Permission::ListSupportUsers)?;
        let users = self.users.list_active_by_role(Role::Support).await?;
        Ok(users.iter().map(|u| u.profile()).collect())
    }

    /// Create a user (admin).
    pub async fn create(&self, ctx: &RequestContext, req: NewUserRequest) -> AppResult<UserProfile> {
        self.rbac.require(&ctx.identity, Permission::ManageUsers)?;

        let mut violations = Vec::new();
        if req.password.chars().count() < self.password_min_length {
            violations.push(FieldViolation::new(
                "password",
                format!(
                    "Password must be at least {} characters",
                    self.password_min_length
                ),
            ));
        }
        let role = Role::from_id(req.role_id);
        if role.is_none() {
            violations.push(FieldViolation::new("role_id", "role_id must be 1, 2 or 3"));
        }
        match (role, req.company_id) {
            (Some(Role::Customer), None) => {
                violations.push(FieldViolation::new(
                    "company_id",
                    "Customers must belong to a company",
                ));
            }
            (_, Some(company_id)) => {
                if self.companies.find_active(company_id).await?.is_none() {
                    violations.push(FieldViolation::new(
                        "company_id",
                        format!("Company {company_id} does not exist or is inactive"),
                    ));
                }
            }
            _ => {}
        }
        let Some(role) = role.filter(|_| violations.is_empty()) else {
            return Err(AppError::invalid_fields(violations));
        };

        let password_hash = self.hasher.hash_password(&req.password)?;
        let user = self
            .users
            .create(CreateUser {
                full_name: req.full_name.trim().to_string(),
                username: req.username.trim().to_string(),
                password_hash,
                role,
                company_id: req.company_id,
            })
            .await?;

        info!(
            user_id = user.id,
            actor_id = ctx.user_id(),
            role = %role,
            "User created"
        );
        Ok(user.profile())
    }
}
