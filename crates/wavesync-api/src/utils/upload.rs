//! Multipart parsing for the upload endpoint

use std::collections::HashMap;

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use wavesync_core::models::{CatalogDetails, CatalogKind, UploadRequest, UploadedFile};
use wavesync_core::AppError;

pub const AUDIO_FIELD: &str = "audioFile";
pub const COVER_FIELD: &str = "coverFile";

/// Raw contents of an upload form: text fields plus at most one file per file field.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub audio: Option<UploadedFile>,
    pub cover: Option<UploadedFile>,
}

impl UploadForm {
    fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Shape the form into a typed request. A missing `type` means episode.
    pub fn into_request(self) -> Result<UploadRequest, AppError> {
        let kind = match self.fields.get("type").map(|t| t.trim()) {
            None | Some("") => CatalogKind::Episode,
            Some(value) => value
                .parse::<CatalogKind>()
                .map_err(|e| AppError::InvalidInput(e.to_string()))?,
        };

        let details = match kind {
            CatalogKind::Track => CatalogDetails::Track {
                artist: self.text("artist"),
                album: self.text("album"),
            },
            CatalogKind::Episode => CatalogDetails::Episode {
                host: self.text("host"),
                description: self.text("description"),
                episode_number: parse_episode_number(
                    self.fields.get("episodeNumber").map(String::as_str),
                ),
            },
        };

        Ok(UploadRequest {
            title: self.text("title"),
            category_id: self.text("categoryId"),
            details,
            audio: self.audio,
            cover: self.cover,
        })
    }
}

/// Leading digits of the value; anything unparsable or zero becomes 1.
fn parse_episode_number(value: Option<&str>) -> u32 {
    value
        .map(|v| {
            v.trim()
                .chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>()
        })
        .and_then(|digits| digits.parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body too large: {}", e.body_text()))
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", e.body_text()))
    }
}

/// Read every part of the form. Each file field may appear at most once.
pub async fn extract_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match name.as_str() {
            AUDIO_FIELD | COVER_FIELD => {
                let slot_taken = if name == AUDIO_FIELD {
                    form.audio.is_some()
                } else {
                    form.cover.is_some()
                };
                if slot_taken {
                    return Err(AppError::InvalidInput(format!(
                        "Multiple {} fields are not allowed",
                        name
                    )));
                }

                let filename = field.file_name().map(|s| s.to_string());
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(multipart_error)?;

                tracing::debug!(
                    field = %name,
                    size_bytes = data.len(),
                    filename = ?filename,
                    "Received file part"
                );

                let file = UploadedFile {
                    data,
                    filename,
                    content_type,
                };
                if name == AUDIO_FIELD {
                    form.audio = Some(file);
                } else {
                    form.cover = Some(file);
                }
            }
            _ => {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavesync_core::ErrorMetadata;

    fn form(pairs: &[(&str, &str)]) -> UploadForm {
        UploadForm {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..UploadForm::default()
        }
    }

    #[test]
    fn track_form_maps_artist_and_album() {
        let request = form(&[
            ("type", "track"),
            ("title", "Summer Vibes"),
            ("artist", "The Waves"),
            ("categoryId", "rock"),
        ])
        .into_request()
        .unwrap();

        assert_eq!(request.title, "Summer Vibes");
        assert_eq!(request.category_id, "rock");
        assert_eq!(
            request.details,
            CatalogDetails::Track {
                artist: "The Waves".to_string(),
                album: String::new(),
            }
        );
    }

    #[test]
    fn missing_type_defaults_to_episode() {
        let request = form(&[("title", "Pilot"), ("host", "Sam"), ("episodeNumber", "4")])
            .into_request()
            .unwrap();

        assert_eq!(request.details.kind(), CatalogKind::Episode);
        assert!(matches!(
            request.details,
            CatalogDetails::Episode { episode_number: 4, .. }
        ));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = form(&[("type", "album")]).into_request().unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn episode_number_defaults_to_one() {
        assert_eq!(parse_episode_number(None), 1);
        assert_eq!(parse_episode_number(Some("abc")), 1);
        assert_eq!(parse_episode_number(Some("0")), 1);
        assert_eq!(parse_episode_number(Some("12th")), 12);
    }
}
