//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use helpdesk_core::error::AppError;
use helpdesk_core::result::AppResult;
use helpdesk_entity::user::{CreateUser, Role, User};

use super::db_error;
use crate::store::UserStore;

const USER_COLUMNS: &str = "u.id, u.full_name, u.username, u.password_hash, u.role_id, \
     r.label AS role_label, u.company_id, u.is_active, u.created_at";

/// Repository for user lookups and creation.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_active(&self, id: i64) -> AppResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id \
             WHERE u.id = $1 AND u.is_active"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id \
             WHERE u.username = $1"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by username"))
    }

    async fn list_active(&self) -> AppResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id \
             WHERE u.is_active ORDER BY u.full_name"
        );
        sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list users"))
    }

    async fn list_active_by_role(&self, role: Role) -> AppResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id \
             WHERE u.is_active AND u.role_id = $1 ORDER BY u.full_name"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(role.id())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list users by role"))
    }

    async fn create(&self, user: CreateUser) -> AppResult<User> {
        let sql = format!(
            "WITH u AS (\
                INSERT INTO users (full_name, username, password_hash, role_id, company_id) \
                VALUES ($1, $2, $3, $4, $5) RETURNING *\
             ) SELECT {USER_COLUMNS} FROM u JOIN roles r ON r.id = u.role_id"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.full_name)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.id())
            .bind(user.company_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err)
                    if db_err.constraint() == Some("users_username_key") =>
                {
                    AppError::conflict(format!("Username '{}' is already taken", user.username))
                }
                other => db_error("Failed to create user")(other),
            })
    }

    async fn admin_exists(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE role_id = $1 AND is_active)",
        )
        .bind(Role::Admin.id())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check for admin users"))
    }
}
