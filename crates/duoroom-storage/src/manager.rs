//! Provider construction from configuration.

use std::sync::Arc;

use tracing::info;

use duoroom_core::config::{StorageConfig, StorageProviderKind};
use duoroom_core::result::AppResult;
use duoroom_core::traits::storage::ObjectStorage;

use crate::providers::{LocalStorageProvider, MemoryStorageProvider};

/// Build the object storage selected by `storage.provider`.
pub async fn build_storage(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStorage>> {
    let storage: Arc<dyn ObjectStorage> = match config.provider {
        StorageProviderKind::Local => Arc::new(
            LocalStorageProvider::new(&config.local.root_path, &config.local.public_base_url)
                .await?,
        ),
        StorageProviderKind::Memory => Arc::new(MemoryStorageProvider::new()),
    };
    info!(
        provider = storage.provider_type(),
        max_upload_bytes = config.max_upload_size_bytes,
        "Object storage ready"
    );
    Ok(storage)
}
