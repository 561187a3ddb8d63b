//! Imagery Services Layer
//!
//! Business services of the image lifecycle. Each service holds `Arc` handles
//! to its collaborators ([`ObjectStorage`](imagery_storage::ObjectStorage),
//! [`Presigner`](imagery_storage::Presigner),
//! [`ImageRepository`](imagery_core::ImageRepository)) and no mutable state,
//! so one instance can serve concurrent requests.

pub mod best_effort;
pub mod confirm;
pub mod delete;
pub mod events;
pub mod presign;
pub mod promote;
pub mod queries;

pub use best_effort::{BestEffortReporter, TracingReporter};
pub use confirm::{ConfirmUploadRequest, UploadConfirmer};
pub use delete::ImageDeleter;
pub use events::{ProductCreated, ProductEvent, ProductEventHandler, ProductUpdated};
pub use presign::{PresignIssuer, PresignRequest, PresignResponse};
pub use promote::ImagePromoter;
pub use queries::{DeliveryUrl, ImageQueries};

use imagery_core::{keys, AppError};
use imagery_storage::StorageError;
use validator::ValidationError;

/// Wrap a storage failure that must be surfaced to the caller.
pub(crate) fn storage_error(operation: &'static str, key: &str, error: StorageError) -> AppError {
    AppError::Storage {
        operation,
        key: key.to_string(),
        source: anyhow::Error::new(error),
    }
}

/// Owner ids become a single key segment.
pub(crate) fn validate_owner_id(owner_id: &str) -> Result<(), ValidationError> {
    if keys::is_valid_owner_id(owner_id) {
        Ok(())
    } else {
        let mut error = ValidationError::new("owner_id");
        error.message = Some("Owner id cannot contain '/' or '..'".into());
        Err(error)
    }
}
