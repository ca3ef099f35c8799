//! Local filesystem storage provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use helpdesk_core::error::{AppError, ErrorKind};
use helpdesk_core::result::AppResult;
use helpdesk_core::traits::storage::{ByteStream, StorageProvider};

/// Stores attachment bytes as plain files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a provider rooted at `root_path`, creating the directory.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create attachment root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Map a key to a path inside the root.
    ///
    /// Keys with parent, root or prefix components are rejected so nothing
    /// outside the root can be addressed.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if key.is_empty() || escapes {
            return Err(AppError::storage(format!("Invalid storage key: {key}")));
        }
        Ok(self.root.join(relative))
    }

    fn io_error(action: &str, key: &str, e: std::io::Error) -> AppError {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::not_found(format!("Stored object not found: {key}"))
        } else {
            AppError::with_source(ErrorKind::Storage, format!("Failed to {action}: {key}"), e)
        }
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn read(&self, key: &str) -> AppResult<ByteStream> {
        let path = self.resolve(key)?;
        let file = fs::File::open(&path)
            .await
            .map_err(|e| Self::io_error("open", key, e))?;
        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn read_bytes(&self, key: &str) -> AppResult<Bytes> {
        let path = self.resolve(key)?;
        let data = fs::read(&path)
            .await
            .map_err(|e| Self::io_error("read", key, e))?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, key: &str, data: Bytes) -> AppResult<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::io_error("create directory for", key, e))?;
        }
        fs::write(&path, &data)
            .await
            .map_err(|e| Self::io_error("write", key, e))?;

        debug!(key, bytes = data.len(), "Stored attachment bytes");
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::io_error("delete", key, e)),
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.resolve(key)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| Self::io_error("stat", key, e))
    }
}
