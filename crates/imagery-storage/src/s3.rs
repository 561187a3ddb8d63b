use crate::traits::{ObjectHead, ObjectStorage, PresignedPut, Presigner, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::presigning::{PresignedRequest, PresigningConfig};
use aws_sdk_s3::Client as S3Client;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, Result as ObjectResult};
use std::time::Duration;

/// S3 storage implementation
///
/// Object operations go through object_store. Upload URLs are presigned with
/// the AWS SDK so the `Content-Type` header is part of the signature.
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    presign_client: S3Client,
    bucket: String,
    presign_ttl: Duration,
    internal_host: Option<String>, // e.g. "minio:9000"
    public_host: Option<String>,   // e.g. "localhost:9000"
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://minio:9000" for MinIO)
    /// * `public_endpoint_url` - Optional endpoint clients use to reach the store. When set
    ///   together with `endpoint_url`, presigned URLs are rewritten to the public host.
    /// * `presign_ttl` - Lifetime of presigned upload URLs
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        public_endpoint_url: Option<String>,
        presign_ttl: Duration,
    ) -> StorageResult<Self> {
        let region_name = region.clone();
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region_name))
            .load()
            .await;

        let mut s3_config_builder = S3ConfigBuilder::from(&sdk_config);
        if let Some(ref endpoint) = endpoint_url {
            // Path-style addressing for MinIO and other S3-compatible stores
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint.clone())
                .force_path_style(true);
        }
        let presign_client = S3Client::from_conf(s3_config_builder.build());

        Ok(S3Storage {
            store,
            presign_client,
            bucket,
            presign_ttl,
            internal_host: endpoint_url.as_deref().map(extract_host),
            public_host: public_endpoint_url.as_deref().map(extract_host),
        })
    }

    /// Swap the internal endpoint host for the public one, if both are configured.
    fn publish_url(&self, url: String) -> String {
        match (&self.internal_host, &self.public_host) {
            (Some(internal), Some(public)) if !internal.is_empty() && !public.is_empty() => {
                url.replacen(internal.as_str(), public, 1)
            }
            _ => url,
        }
    }
}

/// Presign a PUT of `storage_key` with `content_type` bound into the signature.
async fn presign_put_request(
    client: &S3Client,
    bucket: &str,
    storage_key: &str,
    content_type: &str,
    ttl: Duration,
) -> StorageResult<PresignedRequest> {
    let presigning_config =
        PresigningConfig::expires_in(ttl).map_err(|e| StorageError::ConfigError(e.to_string()))?;

    client
        .put_object()
        .bucket(bucket)
        .key(storage_key)
        .content_type(content_type)
        .presigned(presigning_config)
        .await
        .map_err(|e| StorageError::BackendError(e.to_string()))
}

/// Remove the scheme from an endpoint URL: "http://minio:9000" -> "minio:9000".
fn extract_host(endpoint: &str) -> String {
    endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/')
        .to_string()
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn head(&self, storage_key: &str) -> StorageResult<ObjectHead> {
        let location = Path::from(storage_key.to_string());

        match self.store.head(&location).await {
            Ok(meta) => Ok(ObjectHead {
                size: i64::try_from(meta.size).ok(),
            }),
            Err(ObjectStoreError::NotFound { .. }) => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(storage_key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let from = Path::from(from_key.to_string());
        let to = Path::from(to_key.to_string());

        let copy_result: ObjectResult<_> = self.store.copy(&from, &to).await;

        copy_result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(from_key.to_string()),
            other => StorageError::BackendError(other.to_string()),
        })?;

        tracing::info!(
            bucket = %self.bucket,
            from_key = %from_key,
            to_key = %to_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 copy successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[async_trait]
impl Presigner for S3Storage {
    async fn presign_put(
        &self,
        storage_key: &str,
        content_type: &str,
    ) -> StorageResult<PresignedPut> {
        let presigned = presign_put_request(
            &self.presign_client,
            &self.bucket,
            storage_key,
            content_type,
            self.presign_ttl,
        )
        .await?;
        let url = presigned.uri().to_string();

        tracing::debug!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            "S3 presigned PUT generated"
        );

        Ok(PresignedPut {
            url: self.publish_url(url),
            ttl_seconds: self.presign_ttl.as_secs(),
        })
    }
}
