//! Object storage configuration.

use serde::{Deserialize, Serialize};

/// Which object storage provider holds uploaded file bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageProviderKind {
    /// Files on the local filesystem under `local.root_path`.
    Local,
    /// Process memory (tests and throwaway deployments).
    Memory,
}

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider to use.
    #[serde(default = "default_provider")]
    pub provider: StorageProviderKind,
    /// Maximum upload size in bytes (default 25 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Local filesystem storage configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root path for local file storage.
    #[serde(default = "default_local_root")]
    pub root_path: String,
    /// Public URL prefix under which stored objects are reachable. When
    /// empty, the locator is the object's filesystem path.
    #[serde(default)]
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            max_upload_size_bytes: default_max_upload(),
            local: LocalStorageConfig::default(),
        }
    }
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
            public_base_url: String::new(),
        }
    }
}

fn default_provider() -> StorageProviderKind {
    StorageProviderKind::Local
}

fn default_max_upload() -> u64 {
    26_214_400 // 25 MB
}

fn default_local_root() -> String {
    "./data/files".to_string()
}
