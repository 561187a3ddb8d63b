//! Test helpers: in-memory collaborators for the lifecycle services.
//!
//! `MockStorage` records every call and supports failure injection,
//! `InMemoryImageRepository` enforces versions like the PostgreSQL store, and
//! `RecordingReporter` captures swallowed cleanup failures.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use imagery_core::{
    DeliveryUrlSigner, Image, ImageRepository, NewImage, OwnerType, RepositoryError,
    RepositoryResult,
};
use imagery_services::{
    BestEffortReporter, ImageDeleter, ImagePromoter, ImageQueries, PresignIssuer, UploadConfirmer,
};
use imagery_storage::{
    ObjectHead, ObjectStorage, PresignedPut, Presigner, StorageBackend, StorageError,
    StorageResult,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const KEY_HEX: &str = "943b421c9eb07c830af81030552c86009268de4e532ba2ee2eab8247c6da0881";
pub const SALT_HEX: &str = "520f986b998545b4785e0defbc4f3c1203f22de2374a3d53cb7a7fe9fea309c5";
pub const BUCKET: &str = "catalog";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Head(String),
    Copy(String, String),
    Delete(String),
    Presign(String),
}

/// Mock storage that keeps object sizes in memory
#[derive(Default)]
pub struct MockStorage {
    objects: Mutex<HashMap<String, Option<i64>>>,
    calls: Mutex<Vec<StorageCall>>,
    failing_copies: Mutex<HashSet<String>>,
    fail_head: AtomicBool,
    fail_delete: AtomicBool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an object whose head reports `size`
    pub fn set_object(&self, key: &str, size: i64) {
        self.objects.lock().unwrap().insert(key.to_string(), Some(size));
    }

    /// Put an object whose head reports no content length
    pub fn set_object_without_size(&self, key: &str) {
        self.objects.lock().unwrap().insert(key.to_string(), None);
    }

    pub fn has_object(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    /// Make every copy from `source_key` fail
    pub fn fail_copy_from(&self, source_key: &str) {
        self.failing_copies
            .lock()
            .unwrap()
            .insert(source_key.to_string());
    }

    /// Make head fail with a backend (non not-found) error
    pub fn fail_head(&self) {
        self.fail_head.store(true, Ordering::SeqCst);
    }

    pub fn fail_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn copies(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StorageCall::Copy(from, to) => Some((from, to)),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StorageCall::Delete(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn presigned_keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StorageCall::Presign(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: StorageCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn head(&self, storage_key: &str) -> StorageResult<ObjectHead> {
        self.record(StorageCall::Head(storage_key.to_string()));
        if self.fail_head.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError("head unavailable".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .get(storage_key)
            .map(|size| ObjectHead { size: *size })
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.record(StorageCall::Delete(storage_key.to_string()));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("delete unavailable".to_string()));
        }
        self.objects.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        self.record(StorageCall::Copy(from_key.to_string(), to_key.to_string()));
        if self.failing_copies.lock().unwrap().contains(from_key) {
            return Err(StorageError::BackendError("copy unavailable".to_string()));
        }
        let mut objects = self.objects.lock().unwrap();
        let size = *objects
            .get(from_key)
            .ok_or_else(|| StorageError::NotFound(from_key.to_string()))?;
        objects.insert(to_key.to_string(), size);
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[async_trait]
impl Presigner for MockStorage {
    async fn presign_put(
        &self,
        storage_key: &str,
        _content_type: &str,
    ) -> StorageResult<PresignedPut> {
        self.record(StorageCall::Presign(storage_key.to_string()));
        Ok(PresignedPut {
            url: format!("https://storage.example.com/{}/{}?X-Amz-Expires=900", BUCKET, storage_key),
            ttl_seconds: 900,
        })
    }
}

/// Repository that keeps records in memory and enforces versions
#[derive(Default)]
pub struct InMemoryImageRepository {
    images: Mutex<HashMap<Uuid, Image>>,
    fail_save: AtomicBool,
    concurrent_writer: AtomicBool,
}

impl InMemoryImageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record as-is, bypassing `save`
    pub fn insert(&self, image: Image) {
        self.images.lock().unwrap().insert(image.id, image);
    }

    pub fn get(&self, id: Uuid) -> Option<Image> {
        self.images.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.images.lock().unwrap().len()
    }

    pub fn fail_save(&self) {
        self.fail_save.store(true, Ordering::SeqCst);
    }

    /// Bump the stored version of every record right after it is read, so
    /// the caller's copy is stale by the time it updates.
    pub fn simulate_concurrent_writer(&self) {
        self.concurrent_writer.store(true, Ordering::SeqCst);
    }

    fn after_read(&self, ids: &[Uuid]) {
        if !self.concurrent_writer.load(Ordering::SeqCst) {
            return;
        }
        let mut images = self.images.lock().unwrap();
        for id in ids {
            if let Some(image) = images.get_mut(id) {
                image.version += 1;
            }
        }
    }
}

#[async_trait]
impl ImageRepository for InMemoryImageRepository {
    async fn save(&self, image: &Image) -> RepositoryResult<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(RepositoryError::Backend(anyhow::anyhow!("connection refused")));
        }
        let mut images = self.images.lock().unwrap();
        if images.contains_key(&image.id) {
            return Err(RepositoryError::DuplicateKey(image.id));
        }
        images.insert(image.id, image.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Image>> {
        let found = self.get(id);
        self.after_read(&[id]);
        Ok(found)
    }

    async fn find_by_owner(
        &self,
        owner_type: OwnerType,
        owner_id: &str,
        image_ids: &[Uuid],
    ) -> RepositoryResult<Vec<Image>> {
        let mut found: Vec<Image> = self
            .images
            .lock()
            .unwrap()
            .values()
            .filter(|image| image.owner_type == owner_type && image.owner_id == owner_id)
            .filter(|image| !image.is_deleted())
            .filter(|image| image_ids.is_empty() || image_ids.contains(&image.id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let ids: Vec<Uuid> = found.iter().map(|image| image.id).collect();
        self.after_read(&ids);
        Ok(found)
    }

    async fn update(&self, image: &Image) -> RepositoryResult<Image> {
        let mut images = self.images.lock().unwrap();
        let stored = images
            .get(&image.id)
            .ok_or(RepositoryError::NotFound(image.id))?;
        if stored.version != image.version {
            return Err(RepositoryError::Conflict {
                id: image.id,
                expected_version: image.version,
            });
        }
        let mut updated = image.clone();
        updated.version += 1;
        images.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.images
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(id))
    }
}

/// Reporter that keeps `(operation, key)` of every swallowed failure
#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(String, String)>>,
}

impl RecordingReporter {
    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports.lock().unwrap().clone()
    }
}

impl BestEffortReporter for RecordingReporter {
    fn report(&self, operation: &'static str, key: &str, _error: &StorageError) {
        self.reports
            .lock()
            .unwrap()
            .push((operation.to_string(), key.to_string()));
    }
}

/// Shared collaborators plus service constructors
pub struct TestContext {
    pub storage: Arc<MockStorage>,
    pub repository: Arc<InMemoryImageRepository>,
    pub reporter: Arc<RecordingReporter>,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(MockStorage::new()),
            repository: Arc::new(InMemoryImageRepository::new()),
            reporter: Arc::new(RecordingReporter::default()),
        }
    }

    pub fn presign_issuer(&self) -> PresignIssuer {
        PresignIssuer::new(self.storage.clone())
    }

    pub fn confirmer(&self, max_upload_bytes: i64) -> UploadConfirmer {
        UploadConfirmer::new(
            self.storage.clone(),
            self.repository.clone(),
            self.reporter.clone(),
            max_upload_bytes,
        )
    }

    pub fn promoter(&self) -> ImagePromoter {
        ImagePromoter::new(
            self.storage.clone(),
            self.repository.clone(),
            self.reporter.clone(),
        )
    }

    pub fn deleter(&self) -> ImageDeleter {
        ImageDeleter::new(
            self.storage.clone(),
            self.repository.clone(),
            self.reporter.clone(),
        )
    }

    pub fn queries(&self) -> ImageQueries {
        ImageQueries::new(self.repository.clone(), Arc::new(signer()), BUCKET)
    }

    /// Store a draft image record and its object. `offset_secs` orders records
    /// by creation time.
    pub fn add_draft_image(&self, draft_id: &str, file_name: &str, offset_secs: i64) -> Image {
        let key = format!("product-drafts/{}/{}", draft_id, file_name);
        let mut image = Image::new(NewImage {
            alt: file_name.to_string(),
            owner_type: OwnerType::ProductDraft,
            owner_id: draft_id.to_string(),
            role: "gallery".to_string(),
            key: key.clone(),
            mime: "image/png".to_string(),
            size: 2048,
        })
        .unwrap();
        image.created_at = Utc::now() - ChronoDuration::seconds(3600) + ChronoDuration::seconds(offset_secs);
        image.modified_at = image.created_at;
        self.storage.set_object(&key, 2048);
        self.repository.insert(image.clone());
        image
    }
}

pub fn signer() -> DeliveryUrlSigner {
    DeliveryUrlSigner::from_hex("https://img.example.com", KEY_HEX, SALT_HEX).unwrap()
}
