//! Company management (admin only).

use std::sync::Arc;

use tracing::info;

use helpdesk_auth::{Permission, RbacEnforcer};
use helpdesk_core::error::{AppError, FieldViolation};
use helpdesk_core::result::AppResult;
use helpdesk_database::store::CompanyStore;
use helpdesk_entity::company::{Company, CompanySummary, CreateCompany, UpdateCompany};

use crate::context::RequestContext;

/// Lists, creates, renames and deactivates companies.
#[derive(Debug, Clone)]
pub struct CompanyService {
    companies: Arc<dyn CompanyStore>,
    rbac: Arc<RbacEnforcer>,
}

impl CompanyService {
    /// Creates a new company service.
    pub fn new(companies: Arc<dyn CompanyStore>, rbac: Arc<RbacEnforcer>) -> Self {
        Self { companies, rbac }
    }

    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<CompanySummary>> {
        self.rbac.require(&ctx.identity, Permission::ManageCompanies)?;
        self.companies.list_summaries().await
    }

    pub async fn create(&self, ctx: &RequestContext, name: &str) -> AppResult<Company> {
        self.rbac.require(&ctx.identity, Permission::ManageCompanies)?;
        let name = normalized_name(name)?;
        let company = self.companies.create(CreateCompany { name }).await?;
        info!(company_id = company.id, actor_id = ctx.user_id(), "Company created");
        Ok(company)
    }

    pub async fn update(&self, ctx: &RequestContext, id: i64, name: &str) -> AppResult<Company> {
        self.rbac.require(&ctx.identity, Permission::ManageCompanies)?;
        let name = normalized_name(name)?;
        let company = self
            .companies
            .update(id, UpdateCompany { name })
            .await?
            .ok_or_else(|| AppError::not_found(format!("Company {id} not found")))?;
        info!(company_id = id, actor_id = ctx.user_id(), "Company renamed");
        Ok(company)
    }

    /// Soft-delete. Tickets and users keep their reference.
    pub async fn deactivate(&self, ctx: &RequestContext, id: i64) -> AppResult<()> {
        self.rbac.require(&ctx.identity, Permission::ManageCompanies)?;
        if !self.companies.deactivate(id).await? {
            return Err(AppError::not_found(format!("Company {id} not found")));
        }
        info!(company_id = id, actor_id = ctx.user_id(), "Company deactivated");
        Ok(())
    }
}

fn normalized_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::invalid_fields(vec![FieldViolation::new(
            "name",
            "Company name is required",
        )]));
    }
    Ok(name.to_string())
}
