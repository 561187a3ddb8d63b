//! Service composition: explicit constructors, no container.

use anyhow::{Context, Result};
use imagery_core::{Config, DeliveryUrlSigner, ImageRepository};
use imagery_db::{setup_database, PostgresImageRepository};
use imagery_services::{
    BestEffortReporter, ImageDeleter, ImagePromoter, ImageQueries, PresignIssuer,
    ProductEventHandler, TracingReporter, UploadConfirmer,
};
use imagery_storage::{create_storage, StorageSet};
use std::sync::Arc;

/// Every lifecycle service, wired to the same collaborators.
#[derive(Clone)]
pub struct Services {
    pub presign: PresignIssuer,
    pub confirmer: UploadConfirmer,
    pub promoter: ImagePromoter,
    pub deleter: ImageDeleter,
    pub queries: ImageQueries,
    pub events: ProductEventHandler,
}

impl Services {
    pub fn new(
        storage: StorageSet,
        repository: Arc<dyn ImageRepository>,
        signer: DeliveryUrlSigner,
        config: &Config,
    ) -> Self {
        let reporter: Arc<dyn BestEffortReporter> = Arc::new(TracingReporter);
        let promoter = ImagePromoter::new(
            storage.objects.clone(),
            repository.clone(),
            reporter.clone(),
        );

        Services {
            presign: PresignIssuer::new(storage.presigner.clone()),
            confirmer: UploadConfirmer::new(
                storage.objects.clone(),
                repository.clone(),
                reporter.clone(),
                config.max_upload_bytes,
            ),
            deleter: ImageDeleter::new(storage.objects.clone(), repository.clone(), reporter),
            queries: ImageQueries::new(repository, Arc::new(signer), config.source_bucket()),
            events: ProductEventHandler::new(promoter.clone()),
            promoter,
        }
    }
}

/// Connect storage and the metadata store from configuration.
pub async fn build_services(config: &Config) -> Result<Services> {
    let signer = config
        .delivery_signer()
        .context("Failed to configure delivery URL signer")?;

    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(backend = %storage.objects.backend_type(), "Storage backend ready");

    let pool = setup_database(config).await?;
    let repository: Arc<dyn ImageRepository> = Arc::new(PostgresImageRepository::new(pool));

    Ok(Services::new(storage, repository, signer, config))
}
