//! Ticket use cases: role-scoped reads and lifecycle-governed writes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use helpdesk_auth::{Permission, RbacEnforcer};
use helpdesk_core::error::{AppError, ErrorKind, FieldViolation};
use helpdesk_core::result::AppResult;
use helpdesk_database::store::{CompanyStore, ReferenceStore, Stores, TicketStore, UserStore};
use helpdesk_entity::ticket::{Ticket, TicketDetail, TicketDraft, TicketUpdate};
use helpdesk_entity::user::Role;

use super::lifecycle;
use crate::context::RequestContext;

/// Reads and mutates tickets on behalf of an authenticated caller.
#[derive(Debug, Clone)]
pub struct TicketService {
    tickets: Arc<dyn TicketStore>,
    users: Arc<dyn UserStore>,
    companies: Arc<dyn CompanyStore>,
    reference: Arc<dyn ReferenceStore>,
    rbac: Arc<RbacEnforcer>,
    /// Upper bound on every store call.
    operation_timeout: Duration,
}

impl TicketService {
    /// Creates a new ticket service.
    pub fn new(stores: &Stores, rbac: Arc<RbacEnforcer>, operation_timeout: Duration) -> Self {
        Self {
            tickets: Arc::clone(&stores.tickets),
            users: Arc::clone(&stores.users),
            companies: Arc::clone(&stores.companies),
            reference: Arc::clone(&stores.reference),
            rbac,
            operation_timeout,
        }
    }

    /// Every active ticket in the caller's scope, newest first, each with
    /// its history oldest first.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<TicketDetail>> {
        self.rbac.require(&ctx.identity, Permission::ListTickets)?;
        let scope = self.rbac.ticket_scope(&ctx.identity);

        let tickets = self
            .guarded("list_tickets", None, ctx, self.tickets.list(scope))
            .await?;
        let ids: Vec<i64> = tickets.iter().map(|t| t.id).collect();
        let mut histories = self
            .guarded("list_histories", None, ctx, self.tickets.histories(&ids))
            .await?;

        Ok(tickets
            .into_iter()
            .map(|t| {
                let history = histories.remove(&t.id).unwrap_or_default();
                TicketDetail::new(t, history)
            })
            .collect())
    }

    /// One ticket with its full history.
    pub async fn get(&self, ctx: &RequestContext, id: i64) -> AppResult<TicketDetail> {
        let ticket = self.visible_ticket(ctx, id).await?;
        self.detail(ctx, ticket).await
    }

    /// Load an active ticket the caller may view.
    ///
    /// `NotFound` for missing or inactive tickets, `Forbidden` for tickets
    /// outside the caller's scope.
    pub async fn visible_ticket(&self, ctx: &RequestContext, id: i64) -> AppResult<Ticket> {
        let ticket = self.load(ctx, id).await?;
        self.rbac.authorize_view(&ctx.identity, &ticket)?;
        Ok(ticket)
    }

    /// Create a ticket in status `New` with its first history entry.
    pub async fn create(&self, ctx: &RequestContext, draft: TicketDraft) -> AppResult<TicketDetail> {
        let draft = self.rbac.authorize_create(&ctx.identity, draft)?;
        let (ticket, entry) = lifecycle::plan_create(&ctx.identity, draft)?;

        let mut violations = Vec::new();
        self.check_module(ctx, ticket.module_id, &mut violations).await?;
        self.check_company(ctx, ticket.company_id, &mut violations).await?;
        if let Some(assignee) = ticket.assigned_to {
            self.check_assignee(ctx, assignee, &mut violations).await?;
        }
        if !violations.is_empty() {
            return Err(AppError::invalid_fields(violations));
        }

        let created = self
            .guarded("create_ticket", None, ctx, self.tickets.create(ticket, entry))
            .await?;

        info!(
            ticket_id = created.id,
            actor_id = ctx.user_id(),
            company_id = created.company_id,
            "Ticket created"
        );

        self.detail(ctx, created).await
    }

    /// Apply an update through the lifecycle rules.
    ///
    /// The row change and its history entry are persisted as one unit; on
    /// any failure neither is written.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        update: TicketUpdate,
    ) -> AppResult<TicketDetail> {
        self.rbac.require(&ctx.identity, Permission::UpdateTicket)?;
        let ticket = self.load(ctx, id).await?;
        let update = self.rbac.authorize_update(&ctx.identity, &ticket, update)?;

        if let Some(Some(assignee)) = update.assigned_to {
            if Some(assignee) != ticket.assigned_to {
                let mut violations = Vec::new();
                self.check_assignee(ctx, assignee, &mut violations).await?;
                if !violations.is_empty() {
                    return Err(AppError::invalid_fields(violations));
                }
            }
        }

        let change =
            lifecycle::plan_update(&self.rbac, &ctx.identity, &ticket, update, ctx.request_time)?;
        let appended = change.history.is_some();
        let updated = self
            .guarded("update_ticket", Some(id), ctx, self.tickets.apply(change))
            .await?;

        info!(
            ticket_id = id,
            actor_id = ctx.user_id(),
            from_status = ticket.status_id.id(),
            to_status = updated.status_id.id(),
            assigned_to = ?updated.assigned_to,
            history_appended = appended,
            "Ticket updated"
        );

        self.detail(ctx, updated).await
    }

    /// Soft-delete a ticket. Its history stays in storage.
    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> AppResult<()> {
        self.rbac.require(&ctx.identity, Permission::DeleteTicket)?;
        let removed = self
            .guarded(
                "delete_ticket",
                Some(id),
                ctx,
                self.tickets.deactivate(id, ctx.user_id(), ctx.request_time),
            )
            .await?;
        if !removed {
            return Err(AppError::not_found(format!("Ticket {id} not found")));
        }

        info!(ticket_id = id, actor_id = ctx.user_id(), "Ticket deactivated");
        Ok(())
    }

    async fn load(&self, ctx: &RequestContext, id: i64) -> AppResult<Ticket> {
        self.guarded("find_ticket", Some(id), ctx, self.tickets.find(id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ticket {id} not found")))
    }

    async fn detail(&self, ctx: &RequestContext, ticket: Ticket) -> AppResult<TicketDetail> {
        let history = self
            .guarded("load_history", Some(ticket.id), ctx, self.tickets.history(ticket.id))
            .await?;
        Ok(TicketDetail::new(ticket, history))
    }

    async fn check_module(
        &self,
        ctx: &RequestContext,
        module_id: i32,
        violations: &mut Vec<FieldViolation>,
    ) -> AppResult<()> {
        let exists = self
            .guarded("check_module", None, ctx, self.reference.module_exists(module_id))
            .await?;
        if !exists {
            violations.push(FieldViolation::new(
                "module_id",
                format!("Module {module_id} does not exist"),
            ));
        }
        Ok(())
    }

    async fn check_company(
        &self,
        ctx: &RequestContext,
        company_id: i64,
        violations: &mut Vec<FieldViolation>,
    ) -> AppResult<()> {
        let company = self
            .guarded("check_company", None, ctx, self.companies.find_active(company_id))
            .await?;
        if company.is_none() {
            violations.push(FieldViolation::new(
                "company_id",
                format!("Company {company_id} does not exist or is inactive"),
            ));
        }
        Ok(())
    }

    async fn check_assignee(
        &self,
        ctx: &RequestContext,
        user_id: i64,
        violations: &mut Vec<FieldViolation>,
    ) -> AppResult<()> {
        let user = self
            .guarded("check_assignee", None, ctx, self.users.find_active(user_id))
            .await?;
        if !user.is_some_and(|u| u.role() == Role::Support) {
            violations.push(FieldViolation::new(
                "assigned_to",
                format!("User {user_id} is not an active support user"),
            ));
        }
        Ok(())
    }

    /// Run one store call under the operation timeout and log failures.
    ///
    /// An elapsed timeout drops the in-flight call, which rolls back any
    /// open transaction, and surfaces as `ServiceUnavailable`.
    async fn guarded<T, F>(
        &self,
        operation: &'static str,
        ticket_id: Option<i64>,
        ctx: &RequestContext,
        call: F,
    ) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let result = match tokio::time::timeout(self.operation_timeout, call).await {
            Ok(result) => result,
            Err(elapsed) => Err(AppError::from(elapsed)),
        };

        if let Err(e) = &result {
            let actor_id = ctx.user_id();
            match e.kind {
                ErrorKind::Conflict => {
                    warn!(operation, ?ticket_id, actor_id, error = %e, "Concurrent ticket modification")
                }
                kind if kind.is_expected() => {
                    debug!(operation, ?ticket_id, actor_id, error = %e, "Ticket operation rejected")
                }
                _ => {
                    error!(operation, ?ticket_id, actor_id, error = %e, "Ticket store operation failed")
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use helpdesk_auth::Identity;
    use helpdesk_database::MemoryStore;
    use helpdesk_entity::ticket::{Priority, TicketStatus};

    use super::*;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: TicketService,
        admin: RequestContext,
        support: RequestContext,
        other_support: RequestContext,
        customer: RequestContext,
        company_id: i64,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let acme = store.seed_company("Acme").await;
        let admin = store.seed_user("Ada Admin", "ada", "x", "Admin", None).await;
        let support = store.seed_user("Sam Support", "sam", "x", "Destek", None).await;
        let other = store.seed_user("Sue Support", "sue", "x", "Destek", None).await;
        let customer = store
            .seed_user("Can Customer", "can", "x", "Müşteri", Some(acme.id))
            .await;

        let service = TicketService::new(
            &Stores::memory(store.clone()),
            Arc::new(RbacEnforcer::new()),
            Duration::from_secs(5),
        );
        let ctx = |u: &helpdesk_entity::user::User| RequestContext::new(Identity::from_user(u));
        Fixture {
            admin: ctx(&admin),
            support: ctx(&support),
            other_support: ctx(&other),
            customer: ctx(&customer),
            company_id: acme.id,
            store,
            service,
        }
    }

    fn draft(company_id: Option<i64>) -> TicketDraft {
        TicketDraft {
            company_id,
            module_id: 1,
            subject: "X".into(),
            description: "Y".into(),
            mail_content: Some("Hello, the login page is down".into()),
            email: Some("ops@acme.test".into()),
            priority_id: Priority::Medium,
            assigned_to: None,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let f = fixture().await;
        let created = f.service.create(&f.admin, draft(Some(f.company_id))).await.unwrap();
        assert_eq!(created.ticket.status_id, TicketStatus::New);
        assert_eq!(created.status_history.len(), 1);
        assert_eq!(created.status_history[0].notes.as_deref(), Some(lifecycle::CREATED_NOTE));

        let fetched = f.service.get(&f.admin, created.ticket.id).await.unwrap();
        assert_eq!(fetched.ticket, created.ticket);
        assert_eq!(fetched.ticket.mail_content.as_deref(), Some("Hello, the login page is down"));
        assert_eq!(fetched.status_name, "New");
        assert_eq!(fetched.priority_name, "Medium");
    }

    #[tokio::test]
    async fn test_customer_create_is_clamped() {
        let f = fixture().await;
        let mut d = draft(Some(999));
        d.assigned_to = Some(f.support.user_id());
        let created = f.service.create(&f.customer, d).await.unwrap();
        assert_eq!(created.ticket.company_id, f.company_id);
        assert_eq!(created.ticket.assigned_to, None);
    }

    #[tokio::test]
    async fn test_support_cannot_create() {
        let f = fixture().await;
        let err = f
            .service
            .create(&f.support, draft(Some(f.company_id)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_create_reports_all_reference_violations() {
        let f = fixture().await;
        let mut d = draft(Some(424242));
        d.module_id = 99;
        d.assigned_to = Some(f.customer.user_id());
        let err = f.service.create(&f.admin, d).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let fields: Vec<&str> = err.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["module_id", "company_id", "assigned_to"]);
    }

    #[tokio::test]
    async fn test_lifecycle_scenario() {
        let f = fixture().await;
        let id = f
            .service
            .create(&f.admin, draft(Some(f.company_id)))
            .await
            .unwrap()
            .ticket
            .id;

        // Admin assigns a New ticket: auto-transition to Assigned.
        let assigned = f
            .service
            .update(
                &f.admin,
                id,
                TicketUpdate { assigned_to: Some(Some(f.support.user_id())), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(assigned.ticket.status_id, TicketStatus::Assigned);
        assert_eq!(assigned.ticket.resolved_at, None);
        assert_eq!(assigned.status_history.len(), 2);
        assert_eq!(assigned.status_history[1].status_id, TicketStatus::Assigned);

        // Support completes it.
        let completed = f
            .service
            .update(
                &f.support,
                id,
                TicketUpdate { status_id: Some(TicketStatus::Completed), ..Default::default() },
            )
            .await
            .unwrap();
        assert!(completed.ticket.resolved_at.is_some());
        assert_eq!(completed.status_history.len(), 3);
        assert_eq!(completed.status_history[2].status_id, TicketStatus::Completed);

        // Support priority change is ignored, not rejected.
        let same = f
            .service
            .update(
                &f.support,
                id,
                TicketUpdate { priority_id: Some(Priority::Critical), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(same.ticket.priority_id, Priority::Medium);
        assert_eq!(same.status_history.len(), 3);

        // Support may never move it back to New.
        let err = f
            .service
            .update(
                &f.support,
                id,
                TicketUpdate { status_id: Some(TicketStatus::New), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        let after = f.store.raw_ticket(id).await.unwrap();
        assert_eq!(after.status_id, TicketStatus::Completed);
        assert_eq!(f.store.raw_history(id).await.len(), 3);
    }

    #[tokio::test]
    async fn test_customer_update_forbidden_without_mutation() {
        let f = fixture().await;
        let created = f.service.create(&f.customer, draft(None)).await.unwrap();
        let before = f.store.raw_ticket(created.ticket.id).await.unwrap();

        let err = f
            .service
            .update(
                &f.customer,
                created.ticket.id,
                TicketUpdate { notes: Some("please hurry".into()), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert_eq!(f.store.raw_ticket(created.ticket.id).await.unwrap(), before);
        assert_eq!(f.store.raw_history(created.ticket.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_support_outside_assignment_is_forbidden() {
        let f = fixture().await;
        let mut d = draft(Some(f.company_id));
        d.assigned_to = Some(f.support.user_id());
        let id = f.service.create(&f.admin, d).await.unwrap().ticket.id;

        assert!(f.service.get(&f.support, id).await.is_ok());
        let err = f.service.get(&f.other_support, id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        let err = f
            .service
            .update(
                &f.other_support,
                id,
                TicketUpdate { status_id: Some(TicketStatus::InProgress), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_assigning_non_support_user_is_invalid() {
        let f = fixture().await;
        let id = f
            .service
            .create(&f.admin, draft(Some(f.company_id)))
            .await
            .unwrap()
            .ticket
            .id;
        let err = f
            .service
            .update(
                &f.admin,
                id,
                TicketUpdate { assigned_to: Some(Some(f.customer.user_id())), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.violations[0].field, "assigned_to");
    }

    #[tokio::test]
    async fn test_failed_history_write_leaves_ticket_unchanged() {
        let f = fixture().await;
        let id = f
            .service
            .create(&f.admin, draft(Some(f.company_id)))
            .await
            .unwrap()
            .ticket
            .id;
        let before = f.store.raw_ticket(id).await.unwrap();

        f.store.set_fail_history_writes(true);
        let err = f
            .service
            .update(
                &f.admin,
                id,
                TicketUpdate { status_id: Some(TicketStatus::InProgress), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(!err.kind.is_expected());
        assert_eq!(f.store.raw_ticket(id).await.unwrap(), before);
        assert_eq!(f.store.raw_history(id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_store_outage_is_a_dependency_failure() {
        let f = fixture().await;
        f.store.set_unavailable(true);
        let err = f.service.list(&f.admin).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    }

    #[tokio::test]
    async fn test_identical_update_does_not_append_history() {
        let f = fixture().await;
        let id = f
            .service
            .create(&f.admin, draft(Some(f.company_id)))
            .await
            .unwrap()
            .ticket
            .id;
        let resend = TicketUpdate {
            status_id: Some(TicketStatus::New),
            priority_id: Some(Priority::Medium),
            ..Default::default()
        };
        f.service.update(&f.admin, id, resend.clone()).await.unwrap();
        let again = f.service.update(&f.admin, id, resend).await.unwrap();
        assert_eq!(again.status_history.len(), 1);
        assert_eq!(again.ticket.updated_by, Some(f.admin.user_id()));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_ticket_but_keeps_history() {
        let f = fixture().await;
        let id = f
            .service
            .create(&f.admin, draft(Some(f.company_id)))
            .await
            .unwrap()
            .ticket
            .id;

        let err = f.service.delete(&f.support, id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        f.service.delete(&f.admin, id).await.unwrap();
        let err = f.service.get(&f.admin, id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(f.service.list(&f.admin).await.unwrap().is_empty());
        assert_eq!(f.store.raw_history(id).await.len(), 1);

        let err = f.service.delete(&f.admin, id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_is_role_scoped() {
        let f = fixture().await;
        let initech = f.store.seed_company("Initech").await;
        let mut assigned = draft(Some(f.company_id));
        assigned.assigned_to = Some(f.support.user_id());
        let a = f.service.create(&f.admin, assigned).await.unwrap().ticket.id;
        let b = f.service.create(&f.admin, draft(Some(initech.id))).await.unwrap().ticket.id;

        let ids = |v: Vec<TicketDetail>| v.into_iter().map(|d| d.ticket.id).collect::<Vec<_>>();
        let all = ids(f.service.list(&f.admin).await.unwrap());
        assert_eq!(all.len(), 2);
        assert!(all.contains(&a) && all.contains(&b));
        assert_eq!(ids(f.service.list(&f.support).await.unwrap()), vec![a]);
        assert_eq!(ids(f.service.list(&f.customer).await.unwrap()), vec![a]);
        assert!(ids(f.service.list(&f.other_support).await.unwrap()).is_empty());

        let detail = f.service.list(&f.customer).await.unwrap();
        assert_eq!(detail[0].status_history.len(), 1);
        assert!(detail[0].ticket.created_at <= Utc::now());
    }
}
