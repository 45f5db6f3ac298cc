//! Storage setup and initialization

use anyhow::Result;
use std::sync::Arc;
use wavesync_core::Config;
use wavesync_services::{create_storage, Storage};

/// Build the backend selected by `STORAGE_BACKEND`.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage abstraction...");
    let storage = create_storage(config).await?;
    let backend_type = storage.backend_type();
    tracing::info!(
        backend = %backend_type,
        derives_duration = backend_type.derives_duration(),
        "Storage abstraction initialized successfully"
    );
    Ok(storage)
}
