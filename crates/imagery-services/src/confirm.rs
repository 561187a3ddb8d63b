use imagery_core::{keys, AppError, Image, ImageRepository, NewImage, OwnerType};
use imagery_storage::ObjectStorage;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::best_effort::{delete_object, BestEffortReporter};
use crate::storage_error;

/// Request to register an object the client has uploaded
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmUploadRequest {
    #[validate(length(min = 1, max = 1024, message = "Key must be between 1 and 1024 characters"))]
    pub key: String,
    pub owner_type: String,
    #[validate(
        length(
            min = 1,
            max = 255,
            message = "Owner id must be between 1 and 255 characters"
        ),
        custom(function = "crate::validate_owner_id")
    )]
    pub owner_id: String,
    #[serde(default)]
    #[validate(length(max = 1024, message = "Alt text must be at most 1024 characters"))]
    pub alt: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Mime type must be between 1 and 255 characters"
    ))]
    pub mime: String,
    #[serde(default)]
    #[validate(length(max = 64, message = "Role must be at most 64 characters"))]
    pub role: String,
    /// Client-computed checksum; recorded in logs, not verified
    #[serde(default)]
    pub checksum: Option<String>,
}

/// Verifies an uploaded object and creates its metadata record.
#[derive(Clone)]
pub struct UploadConfirmer {
    storage: Arc<dyn ObjectStorage>,
    repository: Arc<dyn ImageRepository>,
    reporter: Arc<dyn BestEffortReporter>,
    /// 0 disables the size check
    max_upload_bytes: i64,
}

impl UploadConfirmer {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        repository: Arc<dyn ImageRepository>,
        reporter: Arc<dyn BestEffortReporter>,
        max_upload_bytes: i64,
    ) -> Self {
        Self {
            storage,
            repository,
            reporter,
            max_upload_bytes,
        }
    }

    #[tracing::instrument(skip(self, request), fields(storage_key = %request.key, owner_id = %request.owner_id))]
    pub async fn confirm(&self, request: ConfirmUploadRequest) -> Result<Image, AppError> {
        request.validate()?;
        let owner_type: OwnerType = request.owner_type.parse()?;

        if !keys::validate_key(&request.key, owner_type, &request.owner_id) {
            return Err(AppError::KeyMismatch {
                key: request.key,
                expected_prefix: keys::owner_prefix(owner_type, &request.owner_id),
            });
        }

        let head = match self.storage.head(&request.key).await {
            Ok(head) => head,
            Err(e) if e.is_not_found() => return Err(AppError::ObjectNotFound(request.key)),
            Err(e) => return Err(storage_error("head", &request.key, e)),
        };
        let size = head.size.unwrap_or(0);

        if self.max_upload_bytes > 0 && size > self.max_upload_bytes {
            tracing::info!(
                storage_key = %request.key,
                size_bytes = size,
                max_bytes = self.max_upload_bytes,
                "Rejecting oversize upload"
            );
            delete_object(
                self.storage.as_ref(),
                self.reporter.as_ref(),
                "confirm.remove_oversize",
                &request.key,
            )
            .await;
            return Err(AppError::ImageTooLarge {
                size,
                max: self.max_upload_bytes,
            });
        }

        let image = Image::new(NewImage {
            alt: request.alt,
            owner_type,
            owner_id: request.owner_id,
            role: request.role,
            key: request.key,
            mime: request.mime,
            size,
        })?;

        self.repository.save(&image).await?;

        tracing::info!(
            image_id = %image.id,
            storage_key = %image.key,
            size_bytes = image.size,
            checksum = ?request.checksum,
            "Upload confirmed"
        );

        Ok(image)
    }
}
