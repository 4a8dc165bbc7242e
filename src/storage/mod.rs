//! Storage abstraction layer
//!
//! Provides unified interface for in-memory, local filesystem and S3 storage

use async_trait::async_trait;
use bytes::Bytes;

use crate::Result;

pub mod local;
pub mod memory;
pub mod s3;

/// Storage backend trait
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read object from storage, `None` if there is no object at `key`
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Write object to storage
    async fn put(&self, key: &str, data: Bytes) -> Result<()>;

    /// Delete object from storage, missing objects are ignored
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if object exists
    async fn exists(&self, key: &str) -> Result<bool>;

    /// List objects with prefix
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Memory,
    Local {
        root_path: String,
    },
    S3 {
        bucket: String,
        region: String,
        endpoint: Option<String>,
    },
}

/// Create storage backend from config
pub async fn create_storage(config: StorageConfig) -> Result<Box<dyn StorageBackend>> {
    match config {
        StorageConfig::Memory => Ok(Box::new(memory::MemoryStorage::new())),
        StorageConfig::Local { root_path } => {
            let backend = local::LocalStorage::new(root_path)?;
            Ok(Box::new(backend))
        }
        StorageConfig::S3 {
            bucket,
            region,
            endpoint,
        } => {
            let backend = s3::S3Storage::new(bucket, region, endpoint).await?;
            Ok(Box::new(backend))
        }
    }
}
