//! Read-only lookup tables.

pub mod model;

pub use model::LookupEntry;
