//! Imagery Storage Library
//!
//! Object storage collaborators for the image lifecycle: the [`ObjectStorage`]
//! and [`Presigner`] traits plus S3 (via `object_store`) and local filesystem
//! implementations.
//!
//! Keys are passed through verbatim; the owner namespace
//! (`products/`, `product-drafts/`, `users/`) is decided by
//! `imagery_core::keys` before a key ever reaches a backend.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_storage, StorageSet};
pub use imagery_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectHead, ObjectStorage, PresignedPut, Presigner, StorageError, StorageResult};
