//! Object storage trait for pluggable file-byte backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// What an object storage hands back after storing bytes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoredObject {
    /// Provider-specific key used for reads and deletion.
    pub key: String,
    /// Opaque locator shown to clients (a path or a URL).
    pub locator: String,
    /// Size in bytes.
    pub size_bytes: u64,
}

/// Trait for the external binary object storage.
///
/// Stored objects are immutable: they are created once and later deleted,
/// never edited in place.
#[async_trait]
pub trait ObjectStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store `data` under a fresh key derived from `name`.
    async fn store(&self, data: Bytes, name: &str) -> AppResult<StoredObject>;

    /// Read an object's bytes.
    async fn read(&self, key: &str) -> AppResult<Bytes>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;
}
