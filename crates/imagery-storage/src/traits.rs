//! Storage abstraction traits
//!
//! The lifecycle services depend only on these traits. `ObjectStorage` covers
//! object metadata, copy and delete; `Presigner` issues time-bounded upload URLs.

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object metadata returned by a head request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectHead {
    /// Content length, if the backend reports one
    pub size: Option<i64>,
}

/// A presigned PUT URL and its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedPut {
    pub url: String,
    pub ttl_seconds: u64,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Fetch object metadata. A missing object is `StorageError::NotFound`.
    async fn head(&self, storage_key: &str) -> StorageResult<ObjectHead>;

    /// Delete an object. Callers in the lifecycle treat failures as non-fatal.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Copy an object to a new key within the same bucket.
    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

#[async_trait]
pub trait Presigner: Send + Sync {
    /// Generate a PUT-scoped, time-bounded URL for a direct client upload.
    async fn presign_put(&self, storage_key: &str, content_type: &str)
        -> StorageResult<PresignedPut>;
}
