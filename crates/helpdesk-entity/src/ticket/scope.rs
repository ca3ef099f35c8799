//! Role-scoped ticket filter.

use serde::{Deserialize, Serialize};

use super::model::Ticket;

/// Structured read filter applied to every ticket query.
///
/// Always computed server-side from the caller's identity; never built
/// from client input. Inactive tickets are excluded regardless of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketScope {
    /// Every active ticket.
    All,
    /// Tickets assigned to the given user.
    AssignedTo(i64),
    /// Tickets owned by the given company.
    Company(i64),
    /// Matches nothing (customer without a company).
    Nothing,
}

impl TicketScope {
    /// In-memory evaluation of the filter.
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if !ticket.is_active {
            return false;
        }
        match *self {
            Self::All => true,
            Self::AssignedTo(user_id) => ticket.assigned_to == Some(user_id),
            Self::Company(company_id) => ticket.company_id == company_id,
            Self::Nothing => false,
        }
    }
}
