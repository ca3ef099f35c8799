//! Ticket lifecycle rules.
//!
//! Pure planning functions: given the current ticket, an authorized request
//! and the caller, compute the row to persist and the history entry to
//! append. Nothing here touches a store, so a rejection can never leave a
//! partial write behind.

use chrono::{DateTime, Utc};

use helpdesk_auth::{Identity, Permission, RbacEnforcer};
use helpdesk_core::error::{AppError, FieldViolation};
use helpdesk_core::result::AppResult;
use helpdesk_entity::ticket::{
    NewHistoryEntry, NewTicket, Ticket, TicketChange, TicketDraft, TicketStatus, TicketUpdate,
};

/// Note on the first history entry of every ticket.
pub const CREATED_NOTE: &str = "Ticket created";

/// Note used when status or assignment changed and no note was given.
pub const DEFAULT_UPDATE_NOTE: &str = "Status updated";

/// Plan the insert for an authorized, clamped draft.
pub fn plan_create(identity: &Identity, draft: TicketDraft) -> AppResult<(NewTicket, NewHistoryEntry)> {
    let company_id = draft.company_id.ok_or_else(|| {
        AppError::invalid_fields(vec![FieldViolation::new(
            "company_id",
            "company_id is required",
        )])
    })?;

    let ticket = NewTicket {
        company_id,
        module_id: draft.module_id,
        subject: draft.subject,
        description: draft.description,
        mail_content: draft.mail_content,
        email: draft.email,
        priority_id: draft.priority_id,
        assigned_to: draft.assigned_to,
        due_date: draft.due_date,
        created_by: identity.user_id,
    };
    let entry = NewHistoryEntry {
        status_id: TicketStatus::New,
        user_id: identity.user_id,
        notes: Some(CREATED_NOTE.to_string()),
    };
    Ok((ticket, entry))
}

/// Plan an update of `ticket` from an authorized, clamped request.
///
/// Steps, in order:
/// 1. unspecified fields keep their current value;
/// 2. an actor holding `AssignTicket` who sets a new assignee on a `New`
///    ticket moves it to `Assigned`, whatever status was requested;
/// 3. an actor without `ReopenToNew` may not leave the ticket in `New`;
/// 4. `resolved_at` is stamped on entering a closing status and cleared on
///    leaving one;
/// 5. a history entry is planned when status or assignment changed or a
///    non-blank note was given.
pub fn plan_update(
    rbac: &RbacEnforcer,
    identity: &Identity,
    ticket: &Ticket,
    update: TicketUpdate,
    now: DateTime<Utc>,
) -> AppResult<TicketChange> {
    let prior_status = ticket.status_id;

    let mut status = update.status_id.unwrap_or(prior_status);
    let priority = update.priority_id.unwrap_or(ticket.priority_id);
    let assigned_to = update.assigned_to.unwrap_or(ticket.assigned_to);
    let due_date = update.due_date.unwrap_or(ticket.due_date);

    let assignment_changed = assigned_to != ticket.assigned_to;

    if rbac.has(identity, Permission::AssignTicket)
        && assignment_changed
        && assigned_to.is_some()
        && prior_status == TicketStatus::New
    {
        status = TicketStatus::Assigned;
    }

    if status == TicketStatus::New && !rbac.has(identity, Permission::ReopenToNew) {
        return Err(AppError::forbidden(format!(
            "Role '{}' may not leave ticket {} in status New",
            identity.role, ticket.id
        )));
    }

    let resolved_at = match (prior_status.is_closing(), status.is_closing()) {
        (false, true) => Some(now),
        (true, false) => None,
        _ => ticket.resolved_at,
    };

    let status_changed = status != prior_status;
    let notes = update
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let history = if status_changed || assignment_changed || notes.is_some() {
        Some(NewHistoryEntry {
            status_id: status,
            user_id: identity.user_id,
            notes: Some(notes.unwrap_or_else(|| DEFAULT_UPDATE_NOTE.to_string())),
        })
    } else {
        None
    };

    Ok(TicketChange {
        ticket_id: ticket.id,
        expected_version: ticket.version,
        status_id: status,
        priority_id: priority,
        assigned_to,
        due_date,
        resolved_at,
        updated_by: identity.user_id,
        updated_at: now,
        history,
    })
}
