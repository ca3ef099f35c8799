//! Company repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use helpdesk_core::result::AppResult;
use helpdesk_entity::company::{Company, CompanySummary, CreateCompany, UpdateCompany};
use helpdesk_entity::user::Role;

use super::db_error;
use crate::store::CompanyStore;

/// Repository for client companies.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    /// Create a new company repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyStore for CompanyRepository {
    async fn list_summaries(&self) -> AppResult<Vec<CompanySummary>> {
        sqlx::query_as::<_, CompanySummary>(
            "SELECT c.id, c.name, \
               (SELECT COUNT(*) FROM users u \
                 WHERE u.company_id = c.id AND u.is_active AND u.role_id = $1) AS customer_count, \
               (SELECT COUNT(*) FROM tickets t \
                 WHERE t.company_id = c.id AND t.is_active) AS ticket_count \
             FROM companies c WHERE c.is_active ORDER BY c.name",
        )
        .bind(Role::Customer.id())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list companies"))
    }

    async fn find_active(&self, id: i64) -> AppResult<Option<Company>> {
        sqlx::query_as::<_, Company>(
            "SELECT id, name, is_active, created_at FROM companies WHERE id = $1 AND is_active",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find company"))
    }

    async fn create(&self, company: CreateCompany) -> AppResult<Company> {
        sqlx::query_as::<_, Company>(
            "INSERT INTO companies (name) VALUES ($1) RETURNING id, name, is_active, created_at",
        )
        .bind(&company.name)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create company"))
    }

    async fn update(&self, id: i64, company: UpdateCompany) -> AppResult<Option<Company>> {
        sqlx::query_as::<_, Company>(
            "UPDATE companies SET name = $2, updated_at = NOW() WHERE id = $1 AND is_active \
             RETURNING id, name, is_active, created_at",
        )
        .bind(id)
        .bind(&company.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update company"))
    }

    async fn deactivate(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE companies SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to deactivate company"))?;
        Ok(result.rows_affected() > 0)
    }
}
