use crate::keys::generate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::{MediaAsset, StorageBackend, UploadResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Catalog media on the local filesystem, served from `base_url` by a static file server.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Creates `root` if it does not exist yet.
    pub async fn new(root: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Keys are relative and may not climb out of `root`.
    fn resolve(&self, storage_key: &str) -> StorageResult<PathBuf> {
        let escapes = storage_key.is_empty()
            || storage_key.starts_with('/')
            || storage_key.split('/').any(|segment| segment == "..");
        if escapes {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.root.join(storage_key))
    }

    async fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Written aside and renamed so readers never see a partial file.
        let staging = path.with_extension("partial");
        let mut file = fs::File::create(&staging).await?;
        let written = async {
            file.write_all(data).await?;
            file.sync_all().await
        }
        .await;
        drop(file);

        match written {
            Ok(()) => fs::rename(&staging, path).await,
            Err(e) => {
                let _ = fs::remove_file(&staging).await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, asset: MediaAsset) -> StorageResult<UploadResult> {
        let key = generate_storage_key(&asset.target_folder, &asset.extension())?;
        let path = self.resolve(&key)?;
        let start = Instant::now();

        Self::write_file(&path, &asset.buffer).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::info!(
            key = %key,
            kind = asset.content_kind.as_str(),
            size_bytes = asset.size(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Stored object on local disk"
        );

        Ok(UploadResult {
            url: format!("{}/{}", self.base_url, key),
            key,
            derived_duration_seconds: None,
        })
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.resolve(storage_key)?;

        match fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(key = %storage_key, "Deleted local object"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete {}: {}",
                    path.display(),
                    e
                )))
            }
        }
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
