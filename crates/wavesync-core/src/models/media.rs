use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Kind of payload handed to object storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Audio,
    Image,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Audio => "audio",
            ContentKind::Image => "image",
        }
    }

    /// Fallback content type when the client sent none.
    pub fn default_content_type(&self) -> &'static str {
        match self {
            ContentKind::Audio => "audio/mpeg",
            ContentKind::Image => "image/jpeg",
        }
    }

    /// Fallback file extension when the original filename has none.
    pub fn default_extension(&self) -> &'static str {
        match self {
            ContentKind::Audio => "mp3",
            ContentKind::Image => "jpg",
        }
    }
}

/// An uploaded binary payload, alive for the duration of one request.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    pub buffer: Bytes,
    pub content_kind: ContentKind,
    pub target_folder: String,
    pub original_filename: Option<String>,
    pub content_type: Option<String>,
}

impl MediaAsset {
    pub fn new(buffer: Bytes, content_kind: ContentKind, target_folder: impl Into<String>) -> Self {
        Self {
            buffer,
            content_kind,
            target_folder: target_folder.into(),
            original_filename: None,
            content_type: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.original_filename = Some(filename.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or_else(|| self.content_kind.default_content_type())
    }

    /// Lowercased extension of the original filename, or the kind's default.
    pub fn extension(&self) -> String {
        self.original_filename
            .as_deref()
            .and_then(|name| std::path::Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_else(|| self.content_kind.default_extension().to_string())
    }
}

/// Result of a completed object-storage upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Public URL of the stored object.
    pub url: String,
    /// Backend-specific key, used for cleanup.
    pub key: String,
    /// Duration estimate reported by the backend, audio only.
    pub derived_duration_seconds: Option<i64>,
}
