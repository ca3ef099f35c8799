//! Ticket lifecycle and ticket use cases.

pub mod lifecycle;
pub mod service;

pub use service::TicketService;
