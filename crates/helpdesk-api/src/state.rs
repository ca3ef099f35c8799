//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use helpdesk_auth::{IdentityResolver, RbacEnforcer};
use helpdesk_core::config::AppConfig;
use helpdesk_core::traits::storage::StorageProvider;
use helpdesk_database::store::ReferenceStore;
use helpdesk_service::{
    AttachmentService, AuthService, CompanyService, DashboardService, ReferenceService,
    TicketService, UserService,
};

use crate::middleware::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// Every field is cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Used by the health check to ping the database.
    pub reference_store: Arc<dyn ReferenceStore>,
    /// Attachment byte store.
    pub storage: Arc<dyn StorageProvider>,
    /// Per-client request throttle.
    pub rate_limiter: RateLimiter,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer credential to identity.
    pub resolver: Arc<IdentityResolver>,
    /// Permission checks that must run before body validation.
    pub rbac: Arc<RbacEnforcer>,

    // ── Services ─────────────────────────────────────────────
    pub auth_service: Arc<AuthService>,
    pub ticket_service: Arc<TicketService>,
    pub attachment_service: Arc<AttachmentService>,
    pub dashboard_service: Arc<DashboardService>,
    pub reference_service: Arc<ReferenceService>,
    pub company_service: Arc<CompanyService>,
    pub user_service: Arc<UserService>,
}
