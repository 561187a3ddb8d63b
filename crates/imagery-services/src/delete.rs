use imagery_core::{AppError, ImageRepository};
use imagery_storage::ObjectStorage;
use std::sync::Arc;
use uuid::Uuid;

use crate::best_effort::{delete_object, BestEffortReporter};

/// Soft or hard deletion of an image and its storage object.
#[derive(Clone)]
pub struct ImageDeleter {
    storage: Arc<dyn ObjectStorage>,
    repository: Arc<dyn ImageRepository>,
    reporter: Arc<dyn BestEffortReporter>,
}

impl ImageDeleter {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        repository: Arc<dyn ImageRepository>,
        reporter: Arc<dyn BestEffortReporter>,
    ) -> Self {
        Self {
            storage,
            repository,
            reporter,
        }
    }

    /// Remove the storage object (best effort), then either remove the record
    /// (`hard`) or mark it `deleted`.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, image_id: Uuid, hard: bool) -> Result<(), AppError> {
        let mut image = self
            .repository
            .find_by_id(image_id)
            .await?
            .ok_or(AppError::ImageNotFound(image_id))?;

        delete_object(
            self.storage.as_ref(),
            self.reporter.as_ref(),
            "delete.remove_object",
            &image.key,
        )
        .await;

        if hard {
            self.repository.delete(image_id).await?;
            tracing::info!(image_id = %image_id, "Image record removed");
            return Ok(());
        }

        if image.is_deleted() {
            tracing::debug!(image_id = %image_id, "Image already soft-deleted");
            return Ok(());
        }

        image.mark_deleted()?;
        self.repository.update(&image).await?;
        tracing::info!(image_id = %image_id, "Image marked as deleted");

        Ok(())
    }
}
