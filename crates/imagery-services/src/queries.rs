use chrono::{DateTime, Utc};
use imagery_core::{AppError, DeliveryOptions, DeliveryUrlSigner, Image, ImageRepository};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// A signed delivery URL for an image
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryUrl {
    pub url: String,
    /// Echo of the requested expiry, if any
    pub expires_at: Option<DateTime<Utc>>,
}

/// Read paths over image records.
#[derive(Clone)]
pub struct ImageQueries {
    repository: Arc<dyn ImageRepository>,
    signer: Arc<DeliveryUrlSigner>,
    /// Bucket name used in `s3://{bucket}/{key}` source locators
    bucket: String,
}

impl ImageQueries {
    pub fn new(
        repository: Arc<dyn ImageRepository>,
        signer: Arc<DeliveryUrlSigner>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            signer,
            bucket: bucket.into(),
        }
    }

    /// Fetch an image by id, soft-deleted records included.
    #[tracing::instrument(skip(self), fields(image_id = %image_id))]
    pub async fn get_image_by_id(&self, image_id: Uuid) -> Result<Image, AppError> {
        self.repository
            .find_by_id(image_id)
            .await?
            .ok_or(AppError::ImageNotFound(image_id))
    }

    #[tracing::instrument(skip(self, options), fields(image_id = %image_id))]
    pub async fn get_delivery_url(
        &self,
        image_id: Uuid,
        options: &DeliveryOptions,
    ) -> Result<DeliveryUrl, AppError> {
        let image = self.get_image_by_id(image_id).await?;
        let source = format!("s3://{}/{}", self.bucket, image.key);

        Ok(DeliveryUrl {
            url: self.signer.build_url(&source, options),
            expires_at: options.expires,
        })
    }
}
