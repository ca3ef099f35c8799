//! Storage provider trait for attachment payloads.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Byte store holding attachment content by storage key.
///
/// The [`StorageProvider`] trait is defined here in `helpdesk-core`
/// and implemented in `helpdesk-storage`. Keys are relative,
/// `/`-separated paths.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read an object and return its byte stream.
    async fn read(&self, key: &str) -> AppResult<ByteStream>;

    /// Read an object into memory.
    async fn read_bytes(&self, key: &str) -> AppResult<Bytes>;

    /// Write bytes under the given key, creating parents as needed.
    async fn write(&self, key: &str, data: Bytes) -> AppResult<()>;

    /// Delete the object under the given key.
    ///
    /// Returns `false` when nothing was stored there.
    async fn delete(&self, key: &str) -> AppResult<bool>;

    /// Check whether an object exists under the given key.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}
