//! Cloudinary backend
//!
//! Signed uploads through the REST upload API. Audio is sent with `resource_type=auto`
//! so Cloudinary classifies it as video and reports a `duration` estimate.

use crate::traits::{Storage, StorageError, StorageResult};
use crate::{ContentKind, MediaAsset, StorageBackend, UploadResult};
use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    resource_type: String,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Cloudinary storage implementation
#[derive(Clone)]
pub struct CloudinaryStorage {
    client: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryStorage {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(CloudinaryStorage {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            cloud_name,
            api_key,
            api_secret,
        })
    }

    /// Point the client at a different API host (Cloudinary-compatible proxies, tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.api_base, self.cloud_name, resource_type, action
        )
    }

    /// Hex SHA-256 over the alphabetically sorted `key=value` pairs followed by the secret.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => format!("{} ({})", body.error.message, status),
            Err(_) => format!("status {}: {}", status, text),
        }
    }
}

fn resource_type_for(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Audio => "auto",
        ContentKind::Image => "image",
    }
}

/// Keys are `{resource_type}/{public_id}`; public ids may contain slashes.
fn split_key(storage_key: &str) -> StorageResult<(&str, &str)> {
    storage_key
        .split_once('/')
        .filter(|(resource_type, public_id)| !resource_type.is_empty() && !public_id.is_empty())
        .ok_or_else(|| StorageError::InvalidKey(storage_key.to_string()))
}

#[async_trait]
impl Storage for CloudinaryStorage {
    #[tracing::instrument(skip(self, asset), fields(folder = %asset.target_folder, size_bytes = asset.size()))]
    async fn upload(&self, asset: MediaAsset) -> StorageResult<UploadResult> {
        let folder = crate::keys::validate_folder(&asset.target_folder)?.to_string();
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", folder.as_str()), ("timestamp", timestamp.as_str())]);
        let resource_type = resource_type_for(asset.content_kind);
        let kind = asset.content_kind;

        let filename = asset
            .original_filename
            .clone()
            .unwrap_or_else(|| format!("upload.{}", asset.extension()));
        let file_part = reqwest::multipart::Part::bytes(asset.buffer.to_vec())
            .file_name(filename)
            .mime_str(asset.content_type_or_default())
            .map_err(|e| StorageError::UploadFailed(format!("Invalid content type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let start = std::time::Instant::now();

        let response = self
            .client
            .post(self.endpoint(resource_type, "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Cloudinary upload request failed");
                StorageError::UploadFailed(e.to_string())
            })?;

        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            tracing::error!(
                error = %message,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Cloudinary upload rejected"
            );
            return Err(StorageError::UploadFailed(message));
        }

        let body: UploadResponse = response.json().await.map_err(|e| {
            StorageError::BackendError(format!("Failed to parse Cloudinary response: {}", e))
        })?;

        let derived_duration_seconds = match kind {
            ContentKind::Audio => body
                .duration
                .filter(|d| d.is_finite() && *d >= 0.0)
                .map(|d| d.floor() as i64),
            ContentKind::Image => None,
        };

        tracing::info!(
            public_id = %body.public_id,
            resource_type = %body.resource_type,
            derived_duration_secs = ?derived_duration_seconds,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Cloudinary upload successful"
        );

        Ok(UploadResult {
            url: body.secure_url,
            key: format!("{}/{}", body.resource_type, body.public_id),
            derived_duration_seconds,
        })
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let (resource_type, public_id) = split_key(storage_key)?;
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", timestamp.as_str())]);

        let params = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .client
            .post(self.endpoint(resource_type, "destroy"))
            .form(&params)
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::DeleteFailed(
                Self::error_message(response).await,
            ));
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        // "not found" means the object is already gone
        if body.result != "ok" && body.result != "not found" {
            return Err(StorageError::DeleteFailed(format!(
                "Cloudinary destroy returned '{}'",
                body.result
            )));
        }

        tracing::info!(key = %storage_key, result = %body.result, "Cloudinary delete successful");

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Cloudinary
    }
}
