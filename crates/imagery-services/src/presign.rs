use imagery_core::{keys, AppError, OwnerType};
use imagery_storage::Presigner;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::Validate;

use crate::storage_error;

/// Request for a direct-upload URL
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    /// Content type (MIME type) the client will upload with; checked
    /// against the upload whitelist
    pub content_type: String,
    /// Client-side filename; informational only
    #[serde(default)]
    #[validate(length(max = 255, message = "Filename must be at most 255 characters"))]
    pub filename: String,
    /// One of `product`, `product-draft`, `user`
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
    /// Declared size in bytes
    #[serde(default)]
    #[validate(range(min = 0, message = "Size cannot be negative"))]
    pub size: i64,
}

/// Everything the client needs to upload directly to storage
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub upload_url: String,
    pub key: String,
    pub expires_in_seconds: u64,
    pub required_headers: BTreeMap<String, String>,
}

/// Issues presigned upload URLs under the owner's key namespace. Nothing is
/// persisted.
#[derive(Clone)]
pub struct PresignIssuer {
    presigner: Arc<dyn Presigner>,
}

impl PresignIssuer {
    pub fn new(presigner: Arc<dyn Presigner>) -> Self {
        Self { presigner }
    }

    #[tracing::instrument(
        skip(self, request),
        fields(owner_type = %request.owner_type, owner_id = %request.owner_id, size = request.size)
    )]
    pub async fn create_presign(&self, request: PresignRequest) -> Result<PresignResponse, AppError> {
        request.validate()?;

        let extension = keys::extension_for_content_type(&request.content_type)
            .ok_or_else(|| AppError::UnsupportedContentType(request.content_type.clone()))?;
        let owner_type: OwnerType = request.owner_type.parse()?;

        let key = keys::build_key(owner_type, &request.owner_id, extension);

        let presigned = self
            .presigner
            .presign_put(&key, &request.content_type)
            .await
            .map_err(|e| storage_error("presign", &key, e))?;

        tracing::info!(
            storage_key = %key,
            content_type = %request.content_type,
            expires_in_seconds = presigned.ttl_seconds,
            "Issued presigned upload URL"
        );

        let mut required_headers = BTreeMap::new();
        required_headers.insert("Content-Type".to_string(), request.content_type);

        Ok(PresignResponse {
            upload_url: presigned.url,
            key,
            expires_in_seconds: presigned.ttl_seconds,
            required_headers,
        })
    }
}
