//! Types used by the upload coordinator

use wavesync_core::{AppError, Config};
use wavesync_services::{DocumentStoreError, StorageError};

/// Why an ingestion request failed. Nothing is committed to the catalog in any case.
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Upload failed: {0}")]
    Upload(#[from] StorageError),

    #[error("Failed to save catalog entry: {0}")]
    Persistence(#[from] DocumentStoreError),
}

impl From<IngestionError> for AppError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::Validation(msg) => AppError::InvalidInput(msg),
            IngestionError::PayloadTooLarge(msg) => AppError::PayloadTooLarge(msg),
            IngestionError::Upload(e) => AppError::Storage(e.to_string()),
            IngestionError::Persistence(e) => AppError::from(e),
        }
    }
}

/// Folders, limits and defaults applied to every ingestion.
#[derive(Debug, Clone)]
pub struct IngestionSettings {
    pub audio_folder: String,
    pub cover_folder: String,
    pub placeholder_cover_url: String,
    pub max_file_size: usize,
}

impl IngestionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            audio_folder: config.audio_folder().to_string(),
            cover_folder: config.cover_folder().to_string(),
            placeholder_cover_url: config.placeholder_cover_url().to_string(),
            max_file_size: config.max_upload_size_bytes(),
        }
    }
}

/// Duration stored with a new entry and whether it came from a trusted source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolvedDuration {
    pub seconds: u64,
    pub accurate: bool,
}

impl ResolvedDuration {
    /// Stored when neither the store nor the probe could tell; reconciliation picks it up later.
    pub const UNKNOWN: ResolvedDuration = ResolvedDuration {
        seconds: 0,
        accurate: false,
    };
}
