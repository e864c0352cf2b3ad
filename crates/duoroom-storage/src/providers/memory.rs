//! In-memory storage provider.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use duoroom_core::error::AppError;
use duoroom_core::result::AppResult;
use duoroom_core::traits::storage::{ObjectStorage, StoredObject};

use super::object_key;
use crate::naming::sanitize_filename;

/// Keeps objects in a map. Locators use the `memory://` scheme.
#[derive(Debug, Default)]
pub struct MemoryStorageProvider {
    objects: DashMap<String, Bytes>,
}

impl MemoryStorageProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorageProvider {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn store(&self, data: Bytes, name: &str) -> AppResult<StoredObject> {
        let key = object_key(&sanitize_filename(name)?);
        let size_bytes = data.len() as u64;
        self.objects.insert(key.clone(), data);
        Ok(StoredObject {
            locator: format!("memory://{key}"),
            key,
            size_bytes,
        })
    }

    async fn read(&self, key: &str) -> AppResult<Bytes> {
        self.objects
            .get(key)
            .map(|b| b.value().clone())
            .ok_or_else(|| AppError::not_found(format!("Object not found: {key}")))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.objects.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip() {
        let provider = MemoryStorageProvider::new();
        let stored = provider.store(Bytes::from_static(b"hi"), "a.txt").await.unwrap();
        assert!(stored.locator.starts_with("memory://"));
        assert_eq!(provider.len(), 1);
        provider.delete(&stored.key).await.unwrap();
        assert!(provider.is_empty());
        assert!(provider.read(&stored.key).await.is_err());
    }
}
