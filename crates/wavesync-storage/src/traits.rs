//! Object storage seam shared by the Cloudinary, S3 and local backends.

use crate::{MediaAsset, StorageBackend, UploadResult};
use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Uploads are a single awaited call; backends never hand back a half-written object.
/// Implementations hold no request-scoped state and are shared across requests.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload an asset into its target folder.
    ///
    /// `derived_duration_seconds` is only populated by backends that inspect audio
    /// (see [`StorageBackend::derives_duration`]).
    async fn upload(&self, asset: MediaAsset) -> StorageResult<UploadResult>;

    /// Delete an object by the key returned from [`Storage::upload`].
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
