//! Inbound product events.
//!
//! Wire format: `{"type": "product-created", "payload": {"productId": "p1", "imageId": "..."}}`.

use imagery_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::promote::ImagePromoter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreated {
    pub product_id: String,
    #[serde(default)]
    pub image_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdated {
    pub product_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    ProductUpdated(ProductUpdated),
}

impl ProductEvent {
    pub fn from_json(raw: &[u8]) -> Result<Self, AppError> {
        serde_json::from_slice(raw)
            .map_err(|e| AppError::InvalidInput(format!("Malformed product event: {}", e)))
    }
}

/// Maps product events onto lifecycle operations.
#[derive(Clone)]
pub struct ProductEventHandler {
    promoter: ImagePromoter,
}

impl ProductEventHandler {
    pub fn new(promoter: ImagePromoter) -> Self {
        Self { promoter }
    }

    pub async fn handle(&self, event: ProductEvent) -> Result<(), AppError> {
        match event {
            ProductEvent::ProductCreated(created) => {
                // The draft shares its id with the product it becomes.
                let image_ids: Vec<Uuid> = created.image_id.into_iter().collect();
                let promoted = self
                    .promoter
                    .promote(&created.product_id, &image_ids, &created.product_id)
                    .await?;
                tracing::info!(
                    product_id = %created.product_id,
                    count = promoted.len(),
                    "Handled product-created event"
                );
                Ok(())
            }
            ProductEvent::ProductUpdated(updated) => {
                tracing::warn!(
                    product_id = %updated.product_id,
                    "product-updated handling not implemented yet"
                );
                Ok(())
            }
        }
    }
}
