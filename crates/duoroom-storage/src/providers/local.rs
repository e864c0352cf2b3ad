//! Local filesystem storage provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use duoroom_core::error::{AppError, ErrorKind};
use duoroom_core::result::AppResult;
use duoroom_core::traits::storage::{ObjectStorage, StoredObject};

use super::object_key;
use crate::naming::sanitize_filename;

/// Stores each object as a file below a root directory.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored files.
    root: PathBuf,
    /// Prefix for locators; empty means "use the filesystem path".
    public_base_url: String,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root_path: &str, public_base_url: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a key to a path within the root, refusing keys that would
    /// escape it.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::invalid_input(format!("Invalid object key: {key}")));
        }
        Ok(self.root.join(relative))
    }

    fn locator(&self, key: &str, path: &Path) -> String {
        if self.public_base_url.is_empty() {
            path.display().to_string()
        } else {
            format!("{}/{}", self.public_base_url, key)
        }
    }
}

#[async_trait]
impl ObjectStorage for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn store(&self, data: Bytes, name: &str) -> AppResult<StoredObject> {
        let key = object_key(&sanitize_filename(name)?);
        let full_path = self.resolve(&key)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write file: {key}"), e)
        })?;

        debug!(key = %key, bytes = data.len(), "Stored object");
        Ok(StoredObject {
            locator: self.locator(&key, &full_path),
            size_bytes: data.len() as u64,
            key,
        })
    }

    async fn read(&self, key: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(key)?;
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {key}"))
            } else {
                AppError::with_source(ErrorKind::Storage, format!("Failed to read file: {key}"), e)
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_path = self.resolve(key)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete file: {key}"),
                    e,
                ));
            }
        }
        // The per-object directory is empty now; failing to remove it is harmless.
        if let Some(parent) = full_path.parent() {
            if parent != self.root {
                let _ = fs::remove_dir(parent).await;
            }
        }
        debug!(key = %key, "Deleted object");
        Ok(())
    }
}
