//! Ticket attachment metadata.

pub mod model;

pub use model::{Attachment, NewAttachment};
