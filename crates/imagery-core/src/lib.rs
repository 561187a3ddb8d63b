//! Imagery Core Library
//!
//! This crate provides the image domain model, error types, configuration, the
//! storage key namespace and the delivery URL signer shared by all Imagery
//! components.

pub mod config;
pub mod delivery;
pub mod error;
pub mod keys;
pub mod models;
pub mod repository;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use delivery::{DeliveryOptions, DeliveryUrlSigner};
pub use error::{AppError, ErrorKind, ErrorMetadata, LogLevel};
pub use models::{Image, ImageStatus, NewImage, OwnerType};
pub use repository::{ImageRepository, RepositoryError, RepositoryResult};
pub use storage_types::StorageBackend;
