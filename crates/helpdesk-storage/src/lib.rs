//! # helpdesk-storage
//!
//! Byte storage for ticket attachments. The only provider is the local
//! filesystem; metadata lives in the database crate.

pub mod keys;
pub mod providers;

pub use keys::attachment_key;
pub use providers::local::LocalStorageProvider;
