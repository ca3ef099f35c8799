//! In-memory implementation of every store trait.
//!
//! All state sits behind one async mutex, so each trait call is atomic
//! with respect to every other call. Used by tests and for running the
//! API without PostgreSQL.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use helpdesk_core::error::AppError;
use helpdesk_core::result::AppResult;
use helpdesk_entity::attachment::{Attachment, NewAttachment};
use helpdesk_entity::company::{Company, CompanySummary, CreateCompany, UpdateCompany};
use helpdesk_entity::reference::LookupEntry;
use helpdesk_entity::ticket::{
    NewHistoryEntry, NewTicket, Priority, StatusHistoryEntry, Ticket, TicketChange, TicketScope,
    TicketStatus,
};
use helpdesk_entity::user::{CreateUser, Role, User};

use crate::store::{AttachmentStore, CompanyStore, ReferenceStore, TicketStore, UserStore};

#[derive(Debug)]
struct MemoryState {
    roles: BTreeMap<i32, String>,
    users: BTreeMap<i64, User>,
    companies: BTreeMap<i64, Company>,
    tickets: BTreeMap<i64, Ticket>,
    history: Vec<StatusHistoryEntry>,
    attachments: BTreeMap<i64, Attachment>,
    modules: Vec<LookupEntry>,
    next_id: i64,
}

impl MemoryState {
    fn seeded() -> Self {
        let roles = [Role::Admin, Role::Support, Role::Customer]
            .into_iter()
            .map(|role| (role.id(), role.label().to_string()))
            .collect();

        let modules = vec![
            LookupEntry::new(1, "CRM", Some("Customer relationship management")),
            LookupEntry::new(2, "ERP", Some("Enterprise resource planning")),
            LookupEntry::new(3, "Custom", Some("Custom development")),
        ];

        Self {
            roles,
            users: BTreeMap::new(),
            companies: BTreeMap::new(),
            tickets: BTreeMap::new(),
            history: Vec::new(),
            attachments: BTreeMap::new(),
            modules,
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn role_id_for_label(&mut self, label: &str) -> i32 {
        if let Some((id, _)) = self.roles.iter().find(|(_, l)| l.as_str() == label) {
            return *id;
        }
        let id = self.roles.keys().max().copied().unwrap_or(0) + 1;
        self.roles.insert(id, label.to_string());
        id
    }

    fn push_history(&mut self, ticket_id: i64, entry: &NewHistoryEntry) {
        // Keep created_at non-decreasing per ticket even if the clock steps back.
        let last = self
            .history
            .iter()
            .filter(|h| h.ticket_id == ticket_id)
            .map(|h| h.created_at)
            .max();
        let now = Utc::now();
        let created_at = last.map_or(now, |l| l.max(now));
        let id = self.next_id();
        self.history.push(StatusHistoryEntry {
            id,
            ticket_id,
            status_id: entry.status_id,
            user_id: entry.user_id,
            notes: entry.notes.clone(),
            created_at,
        });
    }
}

/// Process-local store.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    unavailable: AtomicBool,
    fail_history_writes: AtomicBool,
    /// Attachment inserts still allowed; negative means unlimited.
    attachment_inserts_left: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store with roles and modules seeded.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::seeded()),
            unavailable: AtomicBool::new(false),
            fail_history_writes: AtomicBool::new(false),
            attachment_inserts_left: AtomicI64::new(-1),
        }
    }

    /// Make every subsequent call fail as if the store were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make every write that carries a history entry fail.
    pub fn set_fail_history_writes(&self, fail: bool) {
        self.fail_history_writes.store(fail, Ordering::SeqCst);
    }

    /// Let only `remaining` more attachment inserts succeed; `None` lifts
    /// the limit.
    pub fn limit_attachment_inserts(&self, remaining: Option<u32>) {
        let left = remaining.map_or(-1, i64::from);
        self.attachment_inserts_left.store(left, Ordering::SeqCst);
    }

    fn take_attachment_insert(&self) -> AppResult<()> {
        let allowed = self
            .attachment_inserts_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                n if n < 0 => Some(n),
                n => Some(n - 1),
            })
            .is_ok();
        if !allowed {
            return Err(AppError::database("Failed to insert attachment metadata"));
        }
        Ok(())
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::service_unavailable("Store unavailable"));
        }
        Ok(())
    }

    fn check_history_writable(&self) -> AppResult<()> {
        if self.fail_history_writes.load(Ordering::SeqCst) {
            return Err(AppError::database("Failed to append status history"));
        }
        Ok(())
    }

    /// Insert a company directly.
    pub async fn seed_company(&self, name: &str) -> Company {
        let mut state = self.state.lock().await;
        let company = Company {
            id: state.next_id(),
            name: name.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        state.companies.insert(company.id, company.clone());
        company
    }

    /// Insert a user with a raw role label, registering unknown labels.
    pub async fn seed_user(
        &self,
        full_name: &str,
        username: &str,
        password_hash: &str,
        role_label: &str,
        company_id: Option<i64>,
    ) -> User {
        let mut state = self.state.lock().await;
        let role_id = state.role_id_for_label(role_label);
        let user = User {
            id: state.next_id(),
            full_name: full_name.to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role_id,
            role_label: role_label.to_string(),
            company_id,
            is_active: true,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        user
    }

    /// Flip a user's active flag.
    pub async fn set_user_active(&self, id: i64, active: bool) {
        if let Some(user) = self.state.lock().await.users.get_mut(&id) {
            user.is_active = active;
        }
    }

    /// Every history row of a ticket, including rows of inactive tickets.
    pub async fn raw_history(&self, ticket_id: i64) -> Vec<StatusHistoryEntry> {
        self.state
            .lock()
            .await
            .history
            .iter()
            .filter(|h| h.ticket_id == ticket_id)
            .cloned()
            .collect()
    }

    /// Ticket row regardless of its active flag.
    pub async fn raw_ticket(&self, id: i64) -> Option<Ticket> {
        self.state.lock().await.tickets.get(&id).cloned()
    }
}

fn lookup_entries<T: Copy>(
    items: &[T],
    id: fn(T) -> i32,
    label: fn(T) -> &'static str,
) -> Vec<LookupEntry> {
    items
        .iter()
        .map(|item| LookupEntry::new(id(*item), label(*item), None))
        .collect()
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn list(&self, scope: TicketScope) -> AppResult<Vec<Ticket>> {
        self.check_available()?;
        let state = self.state.lock().await;
        let mut tickets: Vec<Ticket> = state
            .tickets
            .values()
            .filter(|t| scope.matches(t))
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tickets)
    }

    async fn find(&self, id: i64) -> AppResult<Option<Ticket>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state.tickets.get(&id).filter(|t| t.is_active).cloned())
    }

    async fn history(&self, ticket_id: i64) -> AppResult<Vec<StatusHistoryEntry>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state
            .history
            .iter()
            .filter(|h| h.ticket_id == ticket_id)
            .cloned()
            .collect())
    }

    async fn histories(
        &self,
        ticket_ids: &[i64],
    ) -> AppResult<HashMap<i64, Vec<StatusHistoryEntry>>> {
        self.check_available()?;
        let state = self.state.lock().await;
        let mut grouped: HashMap<i64, Vec<StatusHistoryEntry>> = HashMap::new();
        for entry in state
            .history
            .iter()
            .filter(|h| ticket_ids.contains(&h.ticket_id))
        {
            grouped.entry(entry.ticket_id).or_default().push(entry.clone());
        }
        Ok(grouped)
    }

    async fn create(&self, ticket: NewTicket, entry: NewHistoryEntry) -> AppResult<Ticket> {
        self.check_available()?;
        self.check_history_writable()?;
        let mut state = self.state.lock().await;
        let created = Ticket {
            id: state.next_id(),
            company_id: ticket.company_id,
            module_id: ticket.module_id,
            subject: ticket.subject,
            description: ticket.description,
            mail_content: ticket.mail_content,
            email: ticket.email,
            status_id: TicketStatus::New,
            priority_id: ticket.priority_id,
            assigned_to: ticket.assigned_to,
            created_by: ticket.created_by,
            created_at: Utc::now(),
            updated_by: None,
            updated_at: None,
            due_date: ticket.due_date,
            resolved_at: None,
            is_active: true,
            version: 0,
        };
        state.tickets.insert(created.id, created.clone());
        state.push_history(created.id, &entry);
        Ok(created)
    }

    async fn apply(&self, change: TicketChange) -> AppResult<Ticket> {
        self.check_available()?;
        if change.history.is_some() {
            self.check_history_writable()?;
        }
        let mut state = self.state.lock().await;
        let ticket = state
            .tickets
            .get_mut(&change.ticket_id)
            .filter(|t| t.is_active)
            .ok_or_else(|| AppError::not_found(format!("Ticket {} not found", change.ticket_id)))?;
        if ticket.version != change.expected_version {
            return Err(AppError::conflict(format!(
                "Ticket {} was modified concurrently",
                change.ticket_id
            )));
        }

        ticket.status_id = change.status_id;
        ticket.priority_id = change.priority_id;
        ticket.assigned_to = change.assigned_to;
        ticket.due_date = change.due_date;
        ticket.resolved_at = change.resolved_at;
        ticket.updated_by = Some(change.updated_by);
        ticket.updated_at = Some(change.updated_at);
        ticket.version += 1;
        let updated = ticket.clone();

        if let Some(entry) = &change.history {
            state.push_history(updated.id, entry);
        }
        Ok(updated)
    }

    async fn deactivate(&self, id: i64, actor: i64, at: DateTime<Utc>) -> AppResult<bool> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        match state.tickets.get_mut(&id).filter(|t| t.is_active) {
            Some(ticket) => {
                ticket.is_active = false;
                ticket.updated_by = Some(actor);
                ticket.updated_at = Some(at);
                ticket.version += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_active(&self, id: i64) -> AppResult<Option<User>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state.users.get(&id).filter(|u| u.is_active).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<User>> {
        self.check_available()?;
        let state = self.state.lock().await;
        let mut users: Vec<User> = state.users.values().filter(|u| u.is_active).cloned().collect();
        users.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(users)
    }

    async fn list_active_by_role(&self, role: Role) -> AppResult<Vec<User>> {
        let users = self.list_active().await?;
        Ok(users.into_iter().filter(|u| u.role_id == role.id()).collect())
    }

    async fn create(&self, user: CreateUser) -> AppResult<User> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(AppError::conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }
        let role_id = user.role.id();
        let role_label = state
            .roles
            .get(&role_id)
            .cloned()
            .unwrap_or_else(|| user.role.label().to_string());
        let created = User {
            id: state.next_id(),
            full_name: user.full_name,
            username: user.username,
            password_hash: user.password_hash,
            role_id,
            role_label,
            company_id: user.company_id,
            is_active: true,
            created_at: Utc::now(),
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn admin_exists(&self) -> AppResult<bool> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .any(|u| u.is_active && u.role_id == Role::Admin.id()))
    }
}

#[async_trait]
impl CompanyStore for MemoryStore {
    async fn list_summaries(&self) -> AppResult<Vec<CompanySummary>> {
        self.check_available()?;
        let state = self.state.lock().await;
        let mut summaries: Vec<CompanySummary> = state
            .companies
            .values()
            .filter(|c| c.is_active)
            .map(|c| CompanySummary {
                id: c.id,
                name: c.name.clone(),
                customer_count: state
                    .users
                    .values()
                    .filter(|u| {
                        u.is_active && u.company_id == Some(c.id) && u.role_id == Role::Customer.id()
                    })
                    .count() as i64,
                ticket_count: state
                    .tickets
                    .values()
                    .filter(|t| t.is_active && t.company_id == c.id)
                    .count() as i64,
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    async fn find_active(&self, id: i64) -> AppResult<Option<Company>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state.companies.get(&id).filter(|c| c.is_active).cloned())
    }

    async fn create(&self, company: CreateCompany) -> AppResult<Company> {
        self.check_available()?;
        Ok(self.seed_company(&company.name).await)
    }

    async fn update(&self, id: i64, company: UpdateCompany) -> AppResult<Option<Company>> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        Ok(state
            .companies
            .get_mut(&id)
            .filter(|c| c.is_active)
            .map(|c| {
                c.name = company.name;
                c.clone()
            }))
    }

    async fn deactivate(&self, id: i64) -> AppResult<bool> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        match state.companies.get_mut(&id).filter(|c| c.is_active) {
            Some(company) => {
                company.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ReferenceStore for MemoryStore {
    async fn modules(&self) -> AppResult<Vec<LookupEntry>> {
        self.check_available()?;
        Ok(self.state.lock().await.modules.clone())
    }

    async fn statuses(&self) -> AppResult<Vec<LookupEntry>> {
        self.check_available()?;
        Ok(lookup_entries(&TicketStatus::ALL, TicketStatus::id, TicketStatus::label))
    }

    async fn priorities(&self) -> AppResult<Vec<LookupEntry>> {
        self.check_available()?;
        Ok(lookup_entries(&Priority::ALL, Priority::id, Priority::label))
    }

    async fn module_exists(&self, id: i32) -> AppResult<bool> {
        self.check_available()?;
        Ok(self.state.lock().await.modules.iter().any(|m| m.id == id))
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.check_available()?;
        Ok(true)
    }
}

#[async_trait]
impl AttachmentStore for MemoryStore {
    async fn create(&self, attachment: NewAttachment) -> AppResult<Attachment> {
        self.check_available()?;
        self.take_attachment_insert()?;
        let mut state = self.state.lock().await;
        let created = Attachment {
            id: state.next_id(),
            ticket_id: attachment.ticket_id,
            file_name: attachment.file_name,
            storage_key: attachment.storage_key,
            size_bytes: attachment.size_bytes,
            mime_type: attachment.mime_type,
            uploaded_by: attachment.uploaded_by,
            uploaded_at: Utc::now(),
        };
        state.attachments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_by_ticket(&self, ticket_id: i64) -> AppResult<Vec<Attachment>> {
        self.check_available()?;
        let state = self.state.lock().await;
        let mut attachments: Vec<Attachment> = state
            .attachments
            .values()
            .filter(|a| a.ticket_id == ticket_id)
            .cloned()
            .collect();
        attachments.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        Ok(attachments)
    }

    async fn find(&self, id: i64) -> AppResult<Option<Attachment>> {
        self.check_available()?;
        Ok(self.state.lock().await.attachments.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        self.check_available()?;
        Ok(self.state.lock().await.attachments.remove(&id).is_some())
    }
}
