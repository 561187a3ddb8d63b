//! Error types module
//!
//! All image lifecycle failures are unified under [`AppError`]. Each variant
//! belongs to one [`ErrorKind`] of the taxonomy (validation, not found,
//! conflict, transient infrastructure) and self-describes how a transport
//! should render it through [`ErrorMetadata`].
//!
//! Persistence adapters report [`RepositoryError`](crate::repository::RepositoryError),
//! which converts into `AppError` unmodified.

use uuid::Uuid;

use crate::models::{ImageStatus, OwnerType};
use crate::repository::RepositoryError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like version conflicts
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Failure category of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; surfaced immediately, never retried.
    Validation,
    /// Missing image or missing storage object where presence was required.
    NotFound,
    /// Concurrent metadata modification; the caller may retry.
    Conflict,
    /// Network or backend failure from a collaborator, propagated unmodified.
    TransientInfra,
    /// Broken internal invariant.
    Internal,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "KEY_MISMATCH")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unsupported owner type: {0}")]
    UnsupportedOwnerType(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Key {key} does not match expected owner prefix {expected_prefix}")]
    KeyMismatch { key: String, expected_prefix: String },

    #[error("Image {image_id} has key outside draft prefix: {key}")]
    KeyOutsidePrefix { image_id: Uuid, key: String },

    #[error("Object not found in storage: {0}")]
    ObjectNotFound(String),

    #[error("Image too large: {size} bytes exceeds max {max} bytes")]
    ImageTooLarge { size: i64, max: i64 },

    #[error("No images found for draft {0}")]
    NoImagesFound(String),

    #[error("Image not found: {0}")]
    ImageNotFound(Uuid),

    #[error("Copy {source_key} -> {dest_key} failed")]
    CopyFailed {
        source_key: String,
        dest_key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Image {image_id} cannot be promoted from owner type {owner_type}")]
    CannotPromote { image_id: Uuid, owner_type: OwnerType },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: ImageStatus, to: ImageStatus },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage {operation} failed for {key}")]
    Storage {
        operation: &'static str,
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

impl AppError {
    /// Taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::UnsupportedOwnerType(_)
            | AppError::UnsupportedContentType(_)
            | AppError::KeyMismatch { .. }
            | AppError::ImageTooLarge { .. }
            | AppError::CannotPromote { .. }
            | AppError::InvalidStatusTransition { .. }
            | AppError::InvalidInput(_) => ErrorKind::Validation,
            AppError::ObjectNotFound(_)
            | AppError::NoImagesFound(_)
            | AppError::ImageNotFound(_) => ErrorKind::NotFound,
            AppError::KeyOutsidePrefix { .. } => ErrorKind::Internal,
            AppError::CopyFailed { .. } | AppError::Storage { .. } => ErrorKind::TransientInfra,
            AppError::Repository(err) => match err {
                RepositoryError::NotFound(_) => ErrorKind::NotFound,
                RepositoryError::Conflict { .. } | RepositoryError::DuplicateKey(_) => {
                    ErrorKind::Conflict
                }
                RepositoryError::Backend(_) => ErrorKind::TransientInfra,
            },
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

/// Static metadata for each variant: (http_status, error_code, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, LogLevel) {
    match err {
        AppError::UnsupportedOwnerType(_) => (400, "UNSUPPORTED_OWNER_TYPE", LogLevel::Debug),
        AppError::UnsupportedContentType(_) => (400, "UNSUPPORTED_CONTENT_TYPE", LogLevel::Debug),
        AppError::KeyMismatch { .. } => (400, "KEY_MISMATCH", LogLevel::Debug),
        AppError::KeyOutsidePrefix { .. } => (500, "KEY_OUTSIDE_PREFIX", LogLevel::Error),
        AppError::ObjectNotFound(_) => (404, "OBJECT_NOT_FOUND", LogLevel::Debug),
        AppError::ImageTooLarge { .. } => (413, "IMAGE_TOO_LARGE", LogLevel::Debug),
        AppError::NoImagesFound(_) => (404, "NO_IMAGES_FOUND", LogLevel::Debug),
        AppError::ImageNotFound(_) => (404, "IMAGE_NOT_FOUND", LogLevel::Debug),
        AppError::CopyFailed { .. } => (502, "COPY_FAILED", LogLevel::Error),
        AppError::CannotPromote { .. } => (409, "CANNOT_PROMOTE", LogLevel::Debug),
        AppError::InvalidStatusTransition { .. } => {
            (409, "INVALID_STATUS_TRANSITION", LogLevel::Debug)
        }
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", LogLevel::Debug),
        AppError::Storage { .. } => (502, "STORAGE_ERROR", LogLevel::Error),
        AppError::Repository(RepositoryError::NotFound(_)) => {
            (404, "NOT_FOUND", LogLevel::Debug)
        }
        AppError::Repository(RepositoryError::Conflict { .. }) => {
            (409, "CONFLICT", LogLevel::Warn)
        }
        AppError::Repository(RepositoryError::DuplicateKey(_)) => {
            (409, "DUPLICATE_KEY", LogLevel::Warn)
        }
        AppError::Repository(RepositoryError::Backend(_)) => {
            (500, "DATABASE_ERROR", LogLevel::Error)
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Conflict | ErrorKind::TransientInfra)
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::KeyOutsidePrefix { .. } => "Internal server error".to_string(),
            AppError::CopyFailed { .. } | AppError::Storage { .. } => {
                "Failed to access storage".to_string()
            }
            AppError::Repository(RepositoryError::Backend(_)) => {
                "Failed to access database".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_key_mismatch() {
        let err = AppError::KeyMismatch {
            key: "users/u2/a.png".to_string(),
            expected_prefix: "users/u1/".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "KEY_MISMATCH");
        assert!(!err.is_recoverable());
        assert!(err.client_message().contains("users/u1/"));
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_image_too_large() {
        let err = AppError::ImageTooLarge { size: 10, max: 5 };
        assert_eq!(err.http_status_code(), 413);
        assert!(err.client_message().contains("10"));
    }

    #[test]
    fn test_repository_conflict_is_recoverable() {
        let err = AppError::from(RepositoryError::Conflict {
            id: Uuid::nil(),
            expected_version: 3,
        });
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.is_recoverable());
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn test_storage_errors_hide_details() {
        let err = AppError::Storage {
            operation: "head",
            key: "users/u1/a.png".to_string(),
            source: anyhow::anyhow!("connection reset"),
        };
        assert_eq!(err.kind(), ErrorKind::TransientInfra);
        assert_eq!(err.client_message(), "Failed to access storage");
        assert!(err.detailed_message().contains("connection reset"));
    }
}
