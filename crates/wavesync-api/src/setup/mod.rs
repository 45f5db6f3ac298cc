//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod storage;

use crate::services::upload::{IngestionSettings, UploadCoordinator};
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use wavesync_core::Config;
use wavesync_services::{
    connect_document_store, AudioMetadataExtractor, CatalogRepository, DocumentStore,
    DurationProbe, Storage,
};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.environment());

    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;
    tracing::info!("Configuration loaded and validated successfully");

    let store = connect_document_store(&config).await?;
    let storage = storage::setup_storage(&config).await?;
    let probe = AudioMetadataExtractor::new(config.probe_settings().clone())
        .context("Failed to build HTTP client for duration probing")?;

    let state = build_state(&config, store, storage, Arc::new(probe));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

/// Wire the coordinator from already-constructed clients.
pub fn build_state(
    config: &Config,
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn Storage>,
    probe: Arc<dyn DurationProbe>,
) -> Arc<AppState> {
    let upload = UploadCoordinator::new(
        storage,
        probe,
        CatalogRepository::new(store),
        IngestionSettings::from_config(config),
    );
    Arc::new(AppState { upload })
}
