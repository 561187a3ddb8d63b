//! Persistence contract for image records.
//!
//! The lifecycle services only talk to the metadata store through
//! [`ImageRepository`]; the PostgreSQL implementation lives in `imagery-db`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Image, OwnerType};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Image record not found: {0}")]
    NotFound(Uuid),

    /// The stored version no longer matches the version the caller read.
    #[error("Image {id} was modified concurrently (expected version {expected_version})")]
    Conflict { id: Uuid, expected_version: i32 },

    #[error("Image record already exists: {0}")]
    DuplicateKey(Uuid),

    #[error("Metadata store error: {0}")]
    Backend(#[source] anyhow::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Insert a new record. Fails with `DuplicateKey` if the id already exists.
    async fn save(&self, image: &Image) -> RepositoryResult<()>;

    /// Fetch a record by id, whatever its status.
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Image>>;

    /// List non-deleted records of one owner, oldest first.
    ///
    /// An empty `image_ids` slice means no id filter.
    async fn find_by_owner(
        &self,
        owner_type: OwnerType,
        owner_id: &str,
        image_ids: &[Uuid],
    ) -> RepositoryResult<Vec<Image>>;

    /// Persist a mutated record.
    ///
    /// Succeeds only if the stored version equals `image.version`; the stored
    /// version is then incremented and the updated record returned.
    async fn update(&self, image: &Image) -> RepositoryResult<Image>;

    /// Physically remove a record.
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
