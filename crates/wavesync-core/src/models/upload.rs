use bytes::Bytes;
use serde::Serialize;

use super::{CatalogDetails, ContentKind, MediaAsset};

/// A file received from a client, before it is assigned a storage folder.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub data: Bytes,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl UploadedFile {
    pub fn into_asset(self, content_kind: ContentKind, folder: &str) -> MediaAsset {
        let mut asset = MediaAsset::new(self.data, content_kind, folder);
        asset.original_filename = self.filename;
        asset.content_type = self.content_type;
        asset
    }
}

/// One ingestion request: descriptive fields plus the received files.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub title: String,
    pub category_id: String,
    pub details: CatalogDetails,
    pub audio: Option<UploadedFile>,
    pub cover: Option<UploadedFile>,
}

/// What a successful ingestion reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub id: String,
    pub audio_url: String,
    pub cover_url: String,
    pub duration: u64,
    #[serde(skip)]
    pub has_accurate_duration: bool,
}
