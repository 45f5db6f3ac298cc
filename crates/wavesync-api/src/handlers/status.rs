//! Service status handler

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub endpoints: Vec<&'static str>,
}

/// `GET /`: liveness plus the list of exposed endpoints.
pub async fn service_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "Backend running",
        endpoints: vec!["GET /", "POST /upload"],
    })
}
