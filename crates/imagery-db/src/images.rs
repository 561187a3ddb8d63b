//! Image repository: CRUD for the images table with optimistic versioning.

use async_trait::async_trait;
use imagery_core::{Image, ImageRepository, OwnerType, RepositoryError, RepositoryResult};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const IMAGE_COLUMNS: &str =
    "id, version, alt, owner_type, owner_id, role, key, mime, size, status, created_at, modified_at";

/// Repository for the images table.
#[derive(Clone)]
pub struct PostgresImageRepository {
    pool: PgPool,
}

impl PostgresImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: Uuid) -> RepositoryResult<bool> {
        sqlx::query_scalar::<Postgres, bool>("SELECT EXISTS(SELECT 1 FROM images WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(backend_error)
    }
}

fn backend_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Backend(anyhow::Error::new(e))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl ImageRepository for PostgresImageRepository {
    #[tracing::instrument(skip(self, image), fields(db.table = "images", db.record_id = %image.id))]
    async fn save(&self, image: &Image) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO images
                (id, version, alt, owner_type, owner_id, role, key, mime, size, status, created_at, modified_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(image.id)
        .bind(image.version)
        .bind(&image.alt)
        .bind(image.owner_type)
        .bind(&image.owner_id)
        .bind(&image.role)
        .bind(&image.key)
        .bind(&image.mime)
        .bind(image.size)
        .bind(image.status)
        .bind(image.created_at)
        .bind(image.modified_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::DuplicateKey(image.id)
            } else {
                backend_error(e)
            }
        })?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.record_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Image>> {
        let query = format!("SELECT {} FROM images WHERE id = $1", IMAGE_COLUMNS);
        sqlx::query_as::<Postgres, Image>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)
    }

    #[tracing::instrument(
        skip(self, image_ids),
        fields(db.table = "images", owner_type = %owner_type, count = image_ids.len())
    )]
    async fn find_by_owner(
        &self,
        owner_type: OwnerType,
        owner_id: &str,
        image_ids: &[Uuid],
    ) -> RepositoryResult<Vec<Image>> {
        let images = if image_ids.is_empty() {
            let query = format!(
                "SELECT {} FROM images \
                 WHERE owner_type = $1 AND owner_id = $2 AND status <> 'deleted' \
                 ORDER BY created_at, id",
                IMAGE_COLUMNS
            );
            sqlx::query_as::<Postgres, Image>(&query)
                .bind(owner_type)
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await
        } else {
            let query = format!(
                "SELECT {} FROM images \
                 WHERE owner_type = $1 AND owner_id = $2 AND status <> 'deleted' AND id = ANY($3) \
                 ORDER BY created_at, id",
                IMAGE_COLUMNS
            );
            sqlx::query_as::<Postgres, Image>(&query)
                .bind(owner_type)
                .bind(owner_id)
                .bind(image_ids)
                .fetch_all(&self.pool)
                .await
        };
        images.map_err(backend_error)
    }

    #[tracing::instrument(
        skip(self, image),
        fields(db.table = "images", db.record_id = %image.id, version = image.version)
    )]
    async fn update(&self, image: &Image) -> RepositoryResult<Image> {
        let query = format!(
            r#"
            UPDATE images
            SET alt = $3, owner_type = $4, owner_id = $5, role = $6, key = $7, mime = $8,
                size = $9, status = $10, modified_at = $11, version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING {}
            "#,
            IMAGE_COLUMNS
        );
        let updated = sqlx::query_as::<Postgres, Image>(&query)
            .bind(image.id)
            .bind(image.version)
            .bind(&image.alt)
            .bind(image.owner_type)
            .bind(&image.owner_id)
            .bind(&image.role)
            .bind(&image.key)
            .bind(&image.mime)
            .bind(image.size)
            .bind(image.status)
            .bind(image.modified_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)?;

        match updated {
            Some(row) => Ok(row),
            None if self.exists(image.id).await? => {
                tracing::warn!(image_id = %image.id, version = image.version, "Stale image version");
                Err(RepositoryError::Conflict {
                    id: image.id,
                    expected_version: image.version,
                })
            }
            None => Err(RepositoryError::NotFound(image.id)),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }
}
