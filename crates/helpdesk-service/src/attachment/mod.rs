//! Ticket attachments.

pub mod service;
pub mod validation;

pub use service::AttachmentService;
pub use validation::IncomingFile;
