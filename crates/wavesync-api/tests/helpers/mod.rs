//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs in-process: in-memory document store, fake storage, and either a
//! fake probe or the real extractor pointed at a mockito server.

pub mod fixtures;
pub mod storage;

use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use wavesync_api::setup::{build_state, routes};
use wavesync_core::config::AppConfig;
use wavesync_core::{Config, DocumentStoreBackend, ProbeSettings, StorageBackend};
use wavesync_services::{
    CatalogRepository, DocumentStore, DurationProbe, InMemoryDocumentStore, Storage,
};

pub const PLACEHOLDER_COVER_URL: &str = "https://via.placeholder.com/300";

/// Test application: server plus handles on the fakes behind it.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryDocumentStore>,
    pub catalog: CatalogRepository,
}

pub fn test_config() -> Config {
    Config(Box::new(AppConfig {
        server_port: 0,
        environment: "test".to_string(),
        frontend_url: None,
        document_store: DocumentStoreBackend::Memory,
        database_url: None,
        db_max_connections: 1,
        db_timeout_seconds: 5,
        storage_backend: StorageBackend::Local,
        cloudinary_cloud_name: None,
        cloudinary_api_key: None,
        cloudinary_api_secret: None,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: None,
        local_storage_base_url: None,
        max_upload_size_bytes: 50 * 1024 * 1024,
        audio_folder: "wavesync/audio".to_string(),
        cover_folder: "wavesync/covers".to_string(),
        placeholder_cover_url: PLACEHOLDER_COVER_URL.to_string(),
        probe: test_probe_settings(),
        reconcile_interval_ms: 0,
    }))
}

/// Short timeouts and no fallback hosts.
pub fn test_probe_settings() -> ProbeSettings {
    ProbeSettings {
        head_timeout: Duration::from_secs(5),
        range_timeout: Duration::from_secs(5),
        deadline: Duration::from_secs(10),
        fallback_timeout: Duration::from_secs(10),
        fallback_hosts: Vec::new(),
        ..ProbeSettings::default()
    }
}

pub fn setup_test_app(storage: Arc<dyn Storage>, probe: Arc<dyn DurationProbe>) -> TestApp {
    let store = Arc::new(InMemoryDocumentStore::new());
    build_test_app(storage, probe, store.clone(), store)
}

/// Same as [`setup_test_app`], but every catalog insert fails with a database error.
pub fn setup_test_app_with_failing_inserts(
    storage: Arc<dyn Storage>,
    probe: Arc<dyn DurationProbe>,
) -> TestApp {
    let store = Arc::new(InMemoryDocumentStore::new());
    let failing = Arc::new(storage::FailingInsertStore::new(store.clone()));
    build_test_app(storage, probe, store, failing)
}

fn build_test_app(
    storage: Arc<dyn Storage>,
    probe: Arc<dyn DurationProbe>,
    store: Arc<InMemoryDocumentStore>,
    store_dyn: Arc<dyn DocumentStore>,
) -> TestApp {
    let config = test_config();

    let state = build_state(&config, store_dyn.clone(), storage, probe);
    let router = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        store,
        catalog: CatalogRepository::new(store_dyn),
    }
}
