//! Role-scoped dashboard statistics.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::error;

use helpdesk_auth::{Permission, RbacEnforcer};
use helpdesk_core::error::AppError;
use helpdesk_core::result::AppResult;
use helpdesk_database::store::TicketStore;
use helpdesk_entity::ticket::{Priority, Ticket, TicketStatus};

use crate::context::RequestContext;

/// Number of recent tickets returned with the counts.
pub const RECENT_TICKETS: usize = 5;

/// Counts over the caller's ticket scope plus the newest tickets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: usize,
    pub new: usize,
    pub assigned: usize,
    pub in_progress: usize,
    /// Completed or Closed.
    pub resolved: usize,
    pub critical: usize,
    pub waiting: usize,
    pub recent_tickets: Vec<Ticket>,
}

impl DashboardStats {
    /// Aggregate an already scoped ticket set.
    pub fn aggregate(tickets: &[Ticket]) -> Self {
        let count = |pred: &dyn Fn(&Ticket) -> bool| tickets.iter().filter(|t| pred(t)).count();

        let mut recent: Vec<Ticket> = tickets.to_vec();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        recent.truncate(RECENT_TICKETS);

        Self {
            total: tickets.len(),
            new: count(&|t| t.status_id == TicketStatus::New),
            assigned: count(&|t| t.status_id == TicketStatus::Assigned),
            in_progress: count(&|t| t.status_id == TicketStatus::InProgress),
            resolved: count(&|t| t.status_id.is_closing()),
            critical: count(&|t| t.priority_id == Priority::Critical),
            waiting: count(&|t| t.status_id == TicketStatus::Waiting),
            recent_tickets: recent,
        }
    }
}

/// Builds dashboard statistics from the same scope used for listing.
#[derive(Debug, Clone)]
pub struct DashboardService {
    tickets: Arc<dyn TicketStore>,
    rbac: Arc<RbacEnforcer>,
    operation_timeout: Duration,
}

impl DashboardService {
    /// Creates a new dashboard service.
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        rbac: Arc<RbacEnforcer>,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            tickets,
            rbac,
            operation_timeout,
        }
    }

    /// Statistics for the caller's scope.
    pub async fn stats(&self, ctx: &RequestContext) -> AppResult<DashboardStats> {
        self.rbac.require(&ctx.identity, Permission::ViewDashboard)?;
        let scope = self.rbac.ticket_scope(&ctx.identity);

        let tickets = tokio::time::timeout(self.operation_timeout, self.tickets.list(scope))
            .await
            .map_err(AppError::from)
            .and_then(|r| r)
            .inspect_err(|e| {
                if !e.kind.is_expected() {
                    error!(operation = "dashboard_stats", actor_id = ctx.user_id(), error = %e, "Dashboard query failed");
                }
            })?;

        Ok(DashboardStats::aggregate(&tickets))
    }
}
