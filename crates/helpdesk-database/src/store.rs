//! Store traits consumed by the service layer.
//!
//! Each trait is implemented by a PostgreSQL repository in
//! [`crate::repositories`] and by [`crate::memory::MemoryStore`].

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use helpdesk_core::result::AppResult;
use helpdesk_entity::attachment::{Attachment, NewAttachment};
use helpdesk_entity::company::{Company, CompanySummary, CreateCompany, UpdateCompany};
use helpdesk_entity::reference::LookupEntry;
use helpdesk_entity::ticket::{
    NewHistoryEntry, NewTicket, StatusHistoryEntry, Ticket, TicketChange, TicketScope,
};
use helpdesk_entity::user::{CreateUser, Role, User};

use crate::memory::MemoryStore;
use crate::repositories::{
    AttachmentRepository, CompanyRepository, ReferenceRepository, TicketRepository, UserRepository,
};

/// Tickets and their status history.
///
/// Read operations only ever return active tickets.
#[async_trait]
pub trait TicketStore: Send + Sync + Debug + 'static {
    /// Active tickets matching `scope`, newest first.
    async fn list(&self, scope: TicketScope) -> AppResult<Vec<Ticket>>;

    /// Active ticket by id.
    async fn find(&self, id: i64) -> AppResult<Option<Ticket>>;

    /// History of one ticket, oldest first.
    async fn history(&self, ticket_id: i64) -> AppResult<Vec<StatusHistoryEntry>>;

    /// Histories of several tickets keyed by ticket id, each oldest first.
    async fn histories(
        &self,
        ticket_ids: &[i64],
    ) -> AppResult<HashMap<i64, Vec<StatusHistoryEntry>>>;

    /// Insert a `New` ticket and its first history entry as one unit.
    async fn create(&self, ticket: NewTicket, entry: NewHistoryEntry) -> AppResult<Ticket>;

    /// Apply a computed change and its history entry as one unit.
    ///
    /// Fails with `Conflict` when the stored version no longer equals
    /// `change.expected_version`, and with `NotFound` when the ticket is
    /// gone or inactive. Nothing is written in either case.
    async fn apply(&self, change: TicketChange) -> AppResult<Ticket>;

    /// Soft-delete. Returns `false` when no active ticket had this id.
    async fn deactivate(&self, id: i64, actor: i64, at: DateTime<Utc>) -> AppResult<bool>;
}

/// Users joined with their role label.
#[async_trait]
pub trait UserStore: Send + Sync + Debug + 'static {
    /// Active user by id.
    async fn find_active(&self, id: i64) -> AppResult<Option<User>>;

    /// User by exact (case-sensitive) username, active or not.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Active users ordered by full name.
    async fn list_active(&self) -> AppResult<Vec<User>>;

    /// Active users holding the given role id, ordered by full name.
    async fn list_active_by_role(&self, role: Role) -> AppResult<Vec<User>>;

    /// Insert a user. Duplicate usernames fail with `Conflict`.
    async fn create(&self, user: CreateUser) -> AppResult<User>;

    /// Whether at least one active admin exists.
    async fn admin_exists(&self) -> AppResult<bool>;
}

/// Client companies.
#[async_trait]
pub trait CompanyStore: Send + Sync + Debug + 'static {
    /// Active companies ordered by name, with usage counts.
    async fn list_summaries(&self) -> AppResult<Vec<CompanySummary>>;

    async fn find_active(&self, id: i64) -> AppResult<Option<Company>>;

    async fn create(&self, company: CreateCompany) -> AppResult<Company>;

    /// Returns `None` when no active company had this id.
    async fn update(&self, id: i64, company: UpdateCompany) -> AppResult<Option<Company>>;

    /// Returns `false` when no active company had this id.
    async fn deactivate(&self, id: i64) -> AppResult<bool>;
}

/// Read-only lookup tables.
#[async_trait]
pub trait ReferenceStore: Send + Sync + Debug + 'static {
    async fn modules(&self) -> AppResult<Vec<LookupEntry>>;

    /// Ordered by id.
    async fn statuses(&self) -> AppResult<Vec<LookupEntry>>;

    /// Ordered by id.
    async fn priorities(&self) -> AppResult<Vec<LookupEntry>>;

    async fn module_exists(&self, id: i32) -> AppResult<bool>;

    /// Round-trip to the store.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Attachment metadata rows.
#[async_trait]
pub trait AttachmentStore: Send + Sync + Debug + 'static {
    async fn create(&self, attachment: NewAttachment) -> AppResult<Attachment>;

    /// Newest first.
    async fn list_by_ticket(&self, ticket_id: i64) -> AppResult<Vec<Attachment>>;

    async fn find(&self, id: i64) -> AppResult<Option<Attachment>>;

    /// Returns `false` when no row had this id.
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

/// Every store the services need, bundled for construction.
#[derive(Debug, Clone)]
pub struct Stores {
    pub tickets: Arc<dyn TicketStore>,
    pub users: Arc<dyn UserStore>,
    pub companies: Arc<dyn CompanyStore>,
    pub reference: Arc<dyn ReferenceStore>,
    pub attachments: Arc<dyn AttachmentStore>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            tickets: Arc::new(TicketRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
            companies: Arc::new(CompanyRepository::new(pool.clone())),
            reference: Arc::new(ReferenceRepository::new(pool.clone())),
            attachments: Arc::new(AttachmentRepository::new(pool)),
        }
    }

    /// Every trait served by one in-memory store.
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            tickets: store.clone(),
            users: store.clone(),
            companies: store.clone(),
            reference: store.clone(),
            attachments: store,
        }
    }
}
