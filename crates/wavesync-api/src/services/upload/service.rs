//! Upload coordinator
//!
//! One ingestion request: validate → upload audio → (resolve duration ∥ upload cover) →
//! insert catalog entry. Objects uploaded before a later step fails are deleted in the
//! background; the catalog never sees a partial entry.

use std::sync::Arc;
use std::time::Instant;

use wavesync_core::models::{
    ContentKind, NewCatalogEntry, UploadOutcome, UploadRequest, UploadResult, UploadedFile,
};
use wavesync_services::{CatalogRepository, DurationProbe, Storage};

use super::types::{IngestionError, IngestionSettings, ResolvedDuration};

/// Orchestrates storage uploads, duration detection and the catalog insert.
#[derive(Clone)]
pub struct UploadCoordinator {
    storage: Arc<dyn Storage>,
    probe: Arc<dyn DurationProbe>,
    catalog: CatalogRepository,
    settings: IngestionSettings,
}

impl UploadCoordinator {
    pub fn new(
        storage: Arc<dyn Storage>,
        probe: Arc<dyn DurationProbe>,
        catalog: CatalogRepository,
        settings: IngestionSettings,
    ) -> Self {
        Self {
            storage,
            probe,
            catalog,
            settings,
        }
    }

    #[tracing::instrument(skip(self, request), fields(kind = %request.details.kind(), title = %request.title))]
    pub async fn ingest(&self, request: UploadRequest) -> Result<UploadOutcome, IngestionError> {
        let start = Instant::now();
        let UploadRequest {
            title,
            category_id,
            details,
            audio,
            cover,
        } = request;

        let audio =
            audio.ok_or_else(|| IngestionError::Validation("Audio file is required".to_string()))?;
        self.check_size("audioFile", &audio)?;
        if let Some(cover) = &cover {
            self.check_size("coverFile", cover)?;
        }

        let audio_asset = audio.into_asset(ContentKind::Audio, &self.settings.audio_folder);
        let audio_upload = self.storage.upload(audio_asset).await.map_err(|e| {
            tracing::error!(error = %e, "Audio upload failed");
            IngestionError::from(e)
        })?;
        tracing::info!(audio_url = %audio_upload.url, "Audio uploaded");

        // Both only need the audio URL; neither depends on the other.
        let (duration, cover_upload) = tokio::join!(
            self.resolve_duration(&audio_upload),
            self.upload_cover(cover)
        );

        let cover_upload = match cover_upload {
            Ok(upload) => upload,
            Err(e) => {
                tracing::error!(error = %e, "Cover upload failed");
                self.cleanup(vec![audio_upload.key]);
                return Err(e);
            }
        };

        let cover_url = cover_upload
            .as_ref()
            .map(|upload| upload.url.clone())
            .unwrap_or_else(|| self.settings.placeholder_cover_url.clone());

        let entry = NewCatalogEntry {
            title,
            category_id,
            audio_url: audio_upload.url.clone(),
            cover_url: cover_url.clone(),
            duration_seconds: duration.seconds,
            has_accurate_duration: duration.accurate,
            details,
        };

        let id = match self.catalog.create(&entry).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(error = %e, "Catalog insert failed");
                let mut orphans = vec![audio_upload.key];
                orphans.extend(cover_upload.map(|upload| upload.key));
                self.cleanup(orphans);
                return Err(e.into());
            }
        };

        tracing::info!(
            entry_id = %id,
            duration_secs = duration.seconds,
            has_accurate_duration = duration.accurate,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Ingestion completed"
        );

        Ok(UploadOutcome {
            id,
            audio_url: audio_upload.url,
            cover_url,
            duration: duration.seconds,
            has_accurate_duration: duration.accurate,
        })
    }

    fn check_size(&self, field: &str, file: &UploadedFile) -> Result<(), IngestionError> {
        if file.data.len() > self.settings.max_file_size {
            return Err(IngestionError::PayloadTooLarge(format!(
                "{} exceeds maximum allowed size of {} MB",
                field,
                self.settings.max_file_size / 1024 / 1024
            )));
        }
        Ok(())
    }

    /// Store estimate first, then a remote probe, then 0. Never fails.
    async fn resolve_duration(&self, audio: &UploadResult) -> ResolvedDuration {
        if let Some(derived) = audio.derived_duration_seconds {
            if let Ok(seconds) = u64::try_from(derived) {
                tracing::debug!(duration_secs = seconds, "Using storage-derived duration");
                return ResolvedDuration {
                    seconds,
                    accurate: seconds > 0,
                };
            }
        }

        match self.probe.probe(&audio.url).await {
            Ok(result) if result.total_seconds > 0 => ResolvedDuration {
                seconds: result.total_seconds,
                accurate: true,
            },
            Ok(_) => {
                tracing::warn!(
                    url = %audio.url,
                    "Probe reported zero duration; leaving for reconciliation"
                );
                ResolvedDuration::UNKNOWN
            }
            Err(e) => {
                tracing::warn!(
                    url = %audio.url,
                    error = %e,
                    "Duration probe failed; leaving for reconciliation"
                );
                ResolvedDuration::UNKNOWN
            }
        }
    }

    async fn upload_cover(
        &self,
        cover: Option<UploadedFile>,
    ) -> Result<Option<UploadResult>, IngestionError> {
        let Some(cover) = cover else {
            return Ok(None);
        };

        let asset = cover.into_asset(ContentKind::Image, &self.settings.cover_folder);
        let upload = self.storage.upload(asset).await?;
        tracing::info!(cover_url = %upload.url, "Cover uploaded");
        Ok(Some(upload))
    }

    /// Best-effort removal of objects left behind by a failed ingestion.
    fn cleanup(&self, keys: Vec<String>) {
        let storage = self.storage.clone();
        tokio::spawn(async move {
            for key in keys {
                match storage.delete(&key).await {
                    Ok(()) => tracing::info!(storage_key = %key, "Removed orphaned upload"),
                    Err(e) => tracing::warn!(
                        storage_key = %key,
                        error = %e,
                        "Failed to remove orphaned upload"
                    ),
                }
            }
        });
    }
}
