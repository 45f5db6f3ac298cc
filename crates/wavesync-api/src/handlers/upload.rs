//! Catalog upload handler

use std::sync::Arc;

use axum::{extract::Multipart, extract::State, Json};
use serde::Serialize;
use wavesync_core::models::UploadOutcome;
use wavesync_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_upload_form;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: UploadOutcome,
}

/// `POST /upload`: multipart with `audioFile` (required), `coverFile` and descriptive fields.
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_catalog_entry"))]
pub async fn upload_catalog_entry(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let form = extract_upload_form(multipart).await?;
    let request = form.into_request()?;

    let outcome = state
        .upload
        .ingest(request)
        .await
        .map_err(AppError::from)?;

    Ok(Json(UploadResponse {
        success: true,
        outcome,
    }))
}
