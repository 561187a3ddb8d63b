#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{ObjectStorage, Presigner, StorageBackend, StorageError, StorageResult};
use imagery_core::Config;
use std::sync::Arc;

/// The two storage collaborators of the lifecycle services, backed by the
/// same configured store.
#[derive(Clone)]
pub struct StorageSet {
    pub objects: Arc<dyn ObjectStorage>,
    pub presigner: Arc<dyn Presigner>,
}

impl StorageSet {
    fn from_backend<T>(backend: T) -> Self
    where
        T: ObjectStorage + Presigner + 'static,
    {
        let backend = Arc::new(backend);
        StorageSet {
            objects: backend.clone(),
            presigner: backend,
        }
    }
}

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<StorageSet> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(
                bucket,
                region,
                config.s3_endpoint.clone(),
                config.s3_public_endpoint.clone(),
                config.presign_ttl,
            )
            .await?;
            Ok(StorageSet::from_backend(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path).await?;
            Ok(StorageSet::from_backend(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
