//! Traits defined here and implemented in other crates.

pub mod storage;

pub use storage::{ByteStream, StorageProvider};
