//! In-process fakes for the storage backend and the duration probe.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use wavesync_core::models::{ContentKind, DurationProbeResult, MediaAsset, UploadResult};
use wavesync_services::{
    Document, DocumentResult, DocumentStore, DocumentStoreError, DurationProbe, Fields, Filter,
    InMemoryDocumentStore, OrderBy, ProbeError, Storage, StorageBackend, StorageError,
    StorageResult,
};

/// Records every upload and delete; returns fixed URLs per content kind.
pub struct FakeStorage {
    audio_url: String,
    derived_duration_seconds: Option<i64>,
    fail_images: bool,
    fail_audio: bool,
    uploads: Mutex<Vec<(ContentKind, String, usize)>>,
    deletes: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn new(audio_url: impl Into<String>) -> Self {
        Self {
            audio_url: audio_url.into(),
            derived_duration_seconds: None,
            fail_images: false,
            fail_audio: false,
            uploads: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_derived_duration(mut self, seconds: i64) -> Self {
        self.derived_duration_seconds = Some(seconds);
        self
    }

    pub fn failing_images(mut self) -> Self {
        self.fail_images = true;
        self
    }

    pub fn failing_audio(mut self) -> Self {
        self.fail_audio = true;
        self
    }

    /// (kind, folder, size) per upload, in call order.
    pub fn uploads(&self) -> Vec<(ContentKind, String, usize)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for FakeStorage {
    async fn upload(&self, asset: MediaAsset) -> StorageResult<UploadResult> {
        self.uploads.lock().unwrap().push((
            asset.content_kind,
            asset.target_folder.clone(),
            asset.size(),
        ));

        match asset.content_kind {
            ContentKind::Audio if self.fail_audio => Err(StorageError::UploadFailed(
                "audio rejected".to_string(),
            )),
            ContentKind::Audio => Ok(UploadResult {
                url: self.audio_url.clone(),
                key: "audio/test-audio".to_string(),
                derived_duration_seconds: self.derived_duration_seconds,
            }),
            ContentKind::Image if self.fail_images => Err(StorageError::UploadFailed(
                "image rejected".to_string(),
            )),
            ContentKind::Image => Ok(UploadResult {
                url: "https://cdn.test/wavesync/covers/cover.jpg".to_string(),
                key: "image/test-cover".to_string(),
                derived_duration_seconds: None,
            }),
        }
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.deletes.lock().unwrap().push(storage_key.to_string());
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Probe answering from a fixed table; unknown URLs fail with 404.
#[derive(Default)]
pub struct FakeProbe {
    durations: HashMap<String, u64>,
    calls: Mutex<Vec<String>>,
}

impl FakeProbe {
    pub fn with(url: &str, secs: u64) -> Self {
        Self {
            durations: HashMap::from([(url.to_string(), secs)]),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DurationProbe for FakeProbe {
    async fn probe(&self, url: &str) -> Result<DurationProbeResult, ProbeError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.durations
            .get(url)
            .map(|secs| DurationProbeResult::from_total_seconds(*secs))
            .ok_or(ProbeError::Status(404))
    }
}

/// Wraps the in-memory store and refuses every insert with a database error.
pub struct FailingInsertStore {
    inner: Arc<InMemoryDocumentStore>,
}

impl FailingInsertStore {
    pub fn new(inner: Arc<InMemoryDocumentStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl DocumentStore for FailingInsertStore {
    async fn insert(&self, _collection: &str, _fields: Fields) -> DocumentResult<String> {
        Err(DocumentStoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn get(&self, collection: &str, id: &str) -> DocumentResult<Option<Document>> {
        self.inner.get(collection, id).await
    }

    async fn query(
        &self,
        collection: &str,
        filter: Option<&Filter>,
        order: Option<&OrderBy>,
    ) -> DocumentResult<Vec<Document>> {
        self.inner.query(collection, filter, order).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> DocumentResult<()> {
        self.inner.update(collection, id, patch).await
    }
}
