//! RBAC enforcement: permission checks, the role scope and the per-operation
//! ticket guards.
//!
//! Every guard runs before any store mutation. A guard either rejects with
//! `Forbidden` or returns the input rewritten with the role's silent clamps
//! applied.

use helpdesk_core::error::AppError;
use helpdesk_core::result::AppResult;
use helpdesk_entity::ticket::{Ticket, TicketDraft, TicketScope, TicketUpdate};
use helpdesk_entity::user::Role;

use super::policies::{Permission, RbacPolicies};
use crate::identity::Identity;

/// Enforces role-based access control for helpdesk operations.
#[derive(Debug, Clone)]
pub struct RbacEnforcer {
    policies: RbacPolicies,
}

impl RbacEnforcer {
    /// Creates a new enforcer with the default policy set.
    pub fn new() -> Self {
        Self {
            policies: RbacPolicies::new(),
        }
    }

    /// Creates an enforcer with custom policies.
    pub fn with_policies(policies: RbacPolicies) -> Self {
        Self { policies }
    }

    /// Returns `Ok(())` if the caller's role holds `permission`.
    pub fn require(&self, identity: &Identity, permission: Permission) -> AppResult<()> {
        if self.policies.has_permission(identity.role, permission) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Role '{}' does not have permission '{permission:?}'",
                identity.role
            )))
        }
    }

    /// Checks whether the caller's role holds `permission`.
    pub fn has(&self, identity: &Identity, permission: Permission) -> bool {
        self.policies.has_permission(identity.role, permission)
    }

    /// The read filter for the caller. Shared by listing, detail checks and
    /// the dashboard so the three can never disagree.
    pub fn ticket_scope(&self, identity: &Identity) -> TicketScope {
        scope_for(identity)
    }

    /// Allow viewing `ticket` if it lies inside the caller's scope.
    pub fn authorize_view(&self, identity: &Identity, ticket: &Ticket) -> AppResult<()> {
        self.require(identity, Permission::ViewTicket)?;
        if self.ticket_scope(identity).matches(ticket) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Ticket {} is outside the caller's scope",
                ticket.id
            )))
        }
    }

    /// Gate ticket creation and clamp the draft.
    ///
    /// Without `ChooseCompany` the company is forced to the caller's own;
    /// without `AssignOnCreate` the assignee is dropped.
    pub fn authorize_create(
        &self,
        identity: &Identity,
        mut draft: TicketDraft,
    ) -> AppResult<TicketDraft> {
        self.require(identity, Permission::CreateTicket)?;

        if !self.has(identity, Permission::ChooseCompany) {
            let company_id = identity.company_id.ok_or_else(|| {
                AppError::forbidden("Caller does not belong to a company")
            })?;
            draft.company_id = Some(company_id);
        }
        if !self.has(identity, Permission::AssignOnCreate) {
            draft.assigned_to = None;
        }
        Ok(draft)
    }

    /// Gate a ticket update and clamp the request.
    ///
    /// A priority change without `SetPriority` is ignored. An assignment
    /// change without `AssignTicket` is rejected; re-sending the current
    /// assignee is not a change and is dropped. The no-regression rule on
    /// the effective status is applied by the lifecycle planner, which
    /// knows the effective status.
    pub fn authorize_update(
        &self,
        identity: &Identity,
        ticket: &Ticket,
        mut update: TicketUpdate,
    ) -> AppResult<TicketUpdate> {
        self.require(identity, Permission::UpdateTicket)?;
        if !self.ticket_scope(identity).matches(ticket) {
            return Err(AppError::forbidden(format!(
                "Ticket {} is not assigned to the caller",
                ticket.id
            )));
        }

        if !self.has(identity, Permission::SetPriority) {
            update.priority_id = None;
        }

        if !self.has(identity, Permission::AssignTicket) {
            match update.assigned_to {
                Some(requested) if requested != ticket.assigned_to => {
                    return Err(AppError::forbidden("Only admins may change the assignee"));
                }
                _ => update.assigned_to = None,
            }
        }
        Ok(update)
    }

    /// Returns a reference to the underlying policies.
    pub fn policies(&self) -> &RbacPolicies {
        &self.policies
    }
}

impl Default for RbacEnforcer {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure role scope: admin sees everything, support sees tickets assigned to
/// them, customers see their company's tickets (nothing without a company).
pub fn scope_for(identity: &Identity) -> TicketScope {
    match identity.role {
        Role::Admin => TicketScope::All,
        Role::Support => TicketScope::AssignedTo(identity.user_id),
        Role::Customer => identity
            .company_id
            .map(TicketScope::Company)
            .unwrap_or(TicketScope::Nothing),
    }
}
