//! Ticket entities: the row, its audit trail, and the closed status and
//! priority sets.

pub mod change;
pub mod history;
pub mod model;
pub mod priority;
pub mod request;
pub mod scope;
pub mod status;

pub use change::TicketChange;
pub use history::{NewHistoryEntry, StatusHistoryEntry};
pub use model::{NewTicket, Ticket, TicketDetail};
pub use priority::Priority;
pub use request::{TicketDraft, TicketUpdate};
pub use scope::TicketScope;
pub use status::TicketStatus;
