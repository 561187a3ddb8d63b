use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Kind of entity that owns an image.
///
/// The owner type together with the owner id determines the storage key prefix,
/// see [`crate::keys`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "image_owner_type", rename_all = "kebab-case")
)]
#[serde(rename_all = "kebab-case")]
pub enum OwnerType {
    Product,
    ProductDraft,
    User,
}

impl OwnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerType::Product => "product",
            OwnerType::ProductDraft => "product-draft",
            OwnerType::User => "user",
        }
    }
}

impl FromStr for OwnerType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(OwnerType::Product),
            "product-draft" => Ok(OwnerType::ProductDraft),
            "user" => Ok(OwnerType::User),
            other => Err(AppError::UnsupportedOwnerType(other.to_string())),
        }
    }
}

impl Display for OwnerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Image lifecycle status.
///
/// Statuses only move forward: `uploaded -> processing -> ready`, and any
/// non-terminal status may move to `deleted`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "image_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Uploaded,
    Processing,
    Ready,
    Deleted,
}

impl ImageStatus {
    fn rank(&self) -> u8 {
        match self {
            ImageStatus::Uploaded => 0,
            ImageStatus::Processing => 1,
            ImageStatus::Ready => 2,
            ImageStatus::Deleted => 3,
        }
    }

    /// Whether moving from `self` to `next` respects the monotonic progression.
    pub fn can_transition_to(&self, next: ImageStatus) -> bool {
        *self != ImageStatus::Deleted && next.rank() >= self.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStatus::Uploaded => "uploaded",
            ImageStatus::Processing => "processing",
            ImageStatus::Ready => "ready",
            ImageStatus::Deleted => "deleted",
        }
    }
}

impl Display for ImageStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Image aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Image {
    pub id: Uuid,
    pub version: i32,
    pub alt: String,
    pub owner_type: OwnerType,
    pub owner_id: String,
    pub role: String,
    pub key: String,
    pub mime: String,
    pub size: i64,
    pub status: ImageStatus,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Fields required to create a new image record.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub alt: String,
    pub owner_type: OwnerType,
    pub owner_id: String,
    pub role: String,
    pub key: String,
    pub mime: String,
    pub size: i64,
}

impl Image {
    /// Create a fresh image at status `uploaded`, version 1.
    pub fn new(input: NewImage) -> Result<Self, AppError> {
        if input.owner_id.is_empty() {
            return Err(AppError::InvalidInput("owner id is required".to_string()));
        }
        if input.key.is_empty() {
            return Err(AppError::InvalidInput("key is required".to_string()));
        }
        if input.mime.is_empty() {
            return Err(AppError::InvalidInput("mime type is required".to_string()));
        }
        if input.size < 0 {
            return Err(AppError::InvalidInput(
                "size cannot be negative".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Image {
            id: Uuid::new_v4(),
            version: 1,
            alt: input.alt,
            owner_type: input.owner_type,
            owner_id: input.owner_id,
            role: input.role,
            key: input.key,
            mime: input.mime,
            size: input.size,
            status: ImageStatus::Uploaded,
            created_at: now,
            modified_at: now,
        })
    }

    pub fn is_deleted(&self) -> bool {
        self.status == ImageStatus::Deleted
    }

    /// Move a draft image to product ownership and the given key.
    pub fn promote_to_product(&mut self, product_id: &str, new_key: String) -> Result<(), AppError> {
        if self.owner_type != OwnerType::ProductDraft {
            return Err(AppError::CannotPromote {
                image_id: self.id,
                owner_type: self.owner_type,
            });
        }
        self.transition(ImageStatus::Processing)?;
        self.owner_type = OwnerType::Product;
        self.owner_id = product_id.to_string();
        self.key = new_key;
        Ok(())
    }

    pub fn mark_ready(&mut self) -> Result<(), AppError> {
        self.transition(ImageStatus::Ready)
    }

    pub fn mark_deleted(&mut self) -> Result<(), AppError> {
        self.transition(ImageStatus::Deleted)
    }

    fn transition(&mut self, next: ImageStatus) -> Result<(), AppError> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.modified_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_image() -> Image {
        Image::new(NewImage {
            alt: "front".to_string(),
            owner_type: OwnerType::ProductDraft,
            owner_id: "d1".to_string(),
            role: "main".to_string(),
            key: "product-drafts/d1/abc.png".to_string(),
            mime: "image/png".to_string(),
            size: 42,
        })
        .unwrap()
    }

    #[test]
    fn test_new_image_defaults() {
        let image = draft_image();
        assert_eq!(image.version, 1);
        assert_eq!(image.status, ImageStatus::Uploaded);
        assert_eq!(image.created_at, image.modified_at);
    }

    #[test]
    fn test_new_image_rejects_negative_size() {
        let err = Image::new(NewImage {
            alt: String::new(),
            owner_type: OwnerType::User,
            owner_id: "u1".to_string(),
            role: String::new(),
            key: "users/u1/a.png".to_string(),
            mime: "image/png".to_string(),
            size: -1,
        })
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_owner_type_parse() {
        assert_eq!("product".parse::<OwnerType>().unwrap(), OwnerType::Product);
        assert_eq!(
            "product-draft".parse::<OwnerType>().unwrap(),
            OwnerType::ProductDraft
        );
        assert_eq!("user".parse::<OwnerType>().unwrap(), OwnerType::User);
        assert!(matches!(
            "store".parse::<OwnerType>(),
            Err(AppError::UnsupportedOwnerType(_))
        ));
    }

    #[test]
    fn test_owner_type_serde_uses_kebab_case() {
        let json = serde_json::to_string(&OwnerType::ProductDraft).unwrap();
        assert_eq!(json, "\"product-draft\"");
    }

    #[test]
    fn test_promote_to_product() {
        let mut image = draft_image();
        image
            .promote_to_product("p1", "products/p1/abc.png".to_string())
            .unwrap();
        assert_eq!(image.owner_type, OwnerType::Product);
        assert_eq!(image.owner_id, "p1");
        assert_eq!(image.key, "products/p1/abc.png");
        assert_eq!(image.status, ImageStatus::Processing);
    }

    #[test]
    fn test_promote_requires_draft_owner() {
        let mut image = draft_image();
        image.owner_type = OwnerType::User;
        let err = image
            .promote_to_product("p1", "products/p1/abc.png".to_string())
            .unwrap_err();
        assert!(matches!(err, AppError::CannotPromote { .. }));
    }

    #[test]
    fn test_deleted_is_terminal() {
        let mut image = draft_image();
        image.mark_deleted().unwrap();
        assert!(image.is_deleted());
        assert!(matches!(
            image.mark_ready(),
            Err(AppError::InvalidStatusTransition { .. })
        ));
        assert!(image.mark_deleted().is_err());
    }

    #[test]
    fn test_status_cannot_move_backwards() {
        assert!(ImageStatus::Uploaded.can_transition_to(ImageStatus::Processing));
        assert!(ImageStatus::Processing.can_transition_to(ImageStatus::Ready));
        assert!(ImageStatus::Ready.can_transition_to(ImageStatus::Deleted));
        assert!(!ImageStatus::Ready.can_transition_to(ImageStatus::Uploaded));
    }
}
