//! WaveSync API Library
//!
//! HTTP surface for catalog ingestion: the upload handler, the coordinator behind it and
//! application setup.

mod handlers;
mod services;
mod telemetry;
mod utils;

pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use services::upload::{IngestionError, IngestionSettings, UploadCoordinator};
