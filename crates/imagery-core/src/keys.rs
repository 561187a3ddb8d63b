//! Storage key namespace.
//!
//! Key format: `{prefix}{owner_id}/{uuid}{ext}` where the prefix is fixed per
//! owner type (`products/`, `product-drafts/`, `users/`). Every storage
//! mutation checks the key against its owner prefix first so one owner can
//! never address another owner's objects.

use uuid::Uuid;

use crate::models::OwnerType;

/// Storage key prefix for an owner type.
pub fn prefix_for(owner_type: OwnerType) -> &'static str {
    match owner_type {
        OwnerType::Product => "products/",
        OwnerType::ProductDraft => "product-drafts/",
        OwnerType::User => "users/",
    }
}

/// Full prefix of one owner: `{prefix}{owner_id}/`.
pub fn owner_prefix(owner_type: OwnerType, owner_id: &str) -> String {
    format!("{}{}/", prefix_for(owner_type), owner_id)
}

/// True iff `owner_id` is usable as a single key segment: non-empty, no `/`,
/// no `..`.
pub fn is_valid_owner_id(owner_id: &str) -> bool {
    !owner_id.is_empty() && !owner_id.contains('/') && !owner_id.contains("..")
}

/// Allocate a new, collision-resistant key for an owner.
///
/// `extension` includes the leading dot (e.g. `.png`).
pub fn build_key(owner_type: OwnerType, owner_id: &str, extension: &str) -> String {
    format!(
        "{}{}{}",
        owner_prefix(owner_type, owner_id),
        Uuid::new_v4(),
        extension
    )
}

/// True iff `key` lives under the owner's prefix.
pub fn validate_key(key: &str, owner_type: OwnerType, owner_id: &str) -> bool {
    key.starts_with(&owner_prefix(owner_type, owner_id))
}

/// File extension for an accepted upload content type (case-insensitive).
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type.to_ascii_lowercase().as_str() {
        "image/jpeg" => Some(".jpg"),
        "image/png" => Some(".png"),
        "image/webp" => Some(".webp"),
        "image/avif" => Some(".avif"),
        _ => None,
    }
}
