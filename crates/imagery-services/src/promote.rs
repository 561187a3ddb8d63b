//! Draft-to-product promotion.
//!
//! For each draft image, in listing order:
//!
//! 1. check the key lies under `product-drafts/{draft_id}/`
//! 2. derive the destination `products/{product_id}/{rest}`
//! 3. probe the destination; any probe error counts as "absent"
//! 4. copy if absent; a copy failure aborts the batch
//! 5. delete the source, best effort
//! 6. persist the new ownership and key with status `processing`
//!
//! There is no rollback: images promoted before a failure stay promoted, and a
//! retry of the same batch skips the copy for objects already in place.

use imagery_core::{keys, AppError, Image, ImageRepository, OwnerType};
use imagery_storage::ObjectStorage;
use std::sync::Arc;
use uuid::Uuid;

use crate::best_effort::{delete_object, BestEffortReporter};

#[derive(Clone)]
pub struct ImagePromoter {
    storage: Arc<dyn ObjectStorage>,
    repository: Arc<dyn ImageRepository>,
    reporter: Arc<dyn BestEffortReporter>,
}

impl ImagePromoter {
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

    /// Promote the draft's images (all of them when `image_ids` is empty) to
    /// `product_id`. Returns the promoted records.
    #[tracing::instrument(skip(self, image_ids), fields(draft_id = %draft_id, product_id = %product_id, requested = image_ids.len()))]
    pub async fn promote(
        &self,
        draft_id: &str,
        image_ids: &[Uuid],
        product_id: &str,
    ) -> Result<Vec<Image>, AppError> {
        if draft_id.is_empty() {
            return Err(AppError::InvalidInput("draft id is required".to_string()));
        }
        if product_id.is_empty() {
            return Err(AppError::InvalidInput("product id is required".to_string()));
        }
        for id in [draft_id, product_id] {
            if !keys::is_valid_owner_id(id) {
                return Err(AppError::InvalidInput(format!(
                    "owner id cannot contain '/' or '..': {}",
                    id
                )));
            }
        }

        let images = self
            .repository
            .find_by_owner(OwnerType::ProductDraft, draft_id, image_ids)
            .await?;

        if images.is_empty() {
            return Err(AppError::NoImagesFound(draft_id.to_string()));
        }

        let draft_prefix = keys::owner_prefix(OwnerType::ProductDraft, draft_id);
        let product_prefix = keys::owner_prefix(OwnerType::Product, product_id);

        let mut promoted = Vec::with_capacity(images.len());
        for image in images {
            let image = self
                .promote_one(image, &draft_prefix, &product_prefix, product_id)
                .await?;
            promoted.push(image);
        }

        tracing::info!(count = promoted.len(), "Draft images promoted");
        Ok(promoted)
    }

    async fn promote_one(
        &self,
        mut image: Image,
        draft_prefix: &str,
        product_prefix: &str,
        product_id: &str,
    ) -> Result<Image, AppError> {
        let rest = image
            .key
            .strip_prefix(draft_prefix)
            .ok_or_else(|| AppError::KeyOutsidePrefix {
                image_id: image.id,
                key: image.key.clone(),
            })?;
        let source_key = image.key.clone();
        let dest_key = format!("{}{}", product_prefix, rest);

        // A transient probe failure also lands here and causes a redundant copy.
        let exists = match self.storage.head(&dest_key).await {
            Ok(_) => true,
            Err(e) => {
                if !e.is_not_found() {
                    tracing::debug!(error = %e, storage_key = %dest_key, "Destination probe failed, assuming absent");
                }
                false
            }
        };

        if exists {
            tracing::debug!(image_id = %image.id, storage_key = %dest_key, "Destination already present, skipping copy");
        } else {
            self.storage
                .copy(&source_key, &dest_key)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, image_id = %image.id, "Failed to copy draft image");
                    AppError::CopyFailed {
                        source_key: source_key.clone(),
                        dest_key: dest_key.clone(),
                        source: anyhow::Error::new(e),
                    }
                })?;
        }

        delete_object(
            self.storage.as_ref(),
            self.reporter.as_ref(),
            "promote.remove_source",
            &source_key,
        )
        .await;

        image.promote_to_product(product_id, dest_key)?;
        let updated = self.repository.update(&image).await?;

        tracing::info!(
            image_id = %updated.id,
            from_key = %source_key,
            to_key = %updated.key,
            "Image promoted"
        );

        Ok(updated)
    }
}
