use crate::keys::generate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::{MediaAsset, StorageBackend, UploadResult};
use async_trait::async_trait;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload};
use std::time::Instant;

/// Catalog media in an S3 bucket or an S3-compatible provider (MinIO, R2).
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    /// Prefix of every public object URL, without a trailing slash.
    public_base: String,
}

impl S3Storage {
    /// Credentials come from the usual `AWS_*` environment variables. A custom
    /// `endpoint_url` switches to path-style URLs and allows plain HTTP.
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        let public_base = match endpoint_url {
            Some(endpoint) => {
                builder = builder
                    .with_allow_http(endpoint.starts_with("http://"))
                    .with_endpoint(endpoint.clone());
                format!("{}/{}", endpoint.trim_end_matches('/'), bucket)
            }
            None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
        };

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            public_base,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(&self, asset: MediaAsset) -> StorageResult<UploadResult> {
        let key = generate_storage_key(&asset.target_folder, &asset.extension())?;
        let size_bytes = asset.size();
        let content_type = asset.content_type_or_default().to_string();

        // Served straight to players, so the object needs a real content type.
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.clone().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let start = Instant::now();
        self.store
            .put_opts(&Path::from(key.as_str()), PutPayload::from(asset.buffer), options)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            kind = asset.content_kind.as_str(),
            content_type = %content_type,
            size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Stored object in S3"
        );

        Ok(UploadResult {
            url: self.object_url(&key),
            key,
            derived_duration_seconds: None,
        })
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.store
            .delete(&Path::from(storage_key))
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    "S3 delete failed"
                );
                StorageError::DeleteFailed(e.to_string())
            })?;

        tracing::debug!(bucket = %self.bucket, key = %storage_key, "Deleted S3 object");
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
