//! Catalog ingestion: storage uploads, duration resolution and the catalog insert.

mod service;
mod types;

pub use service::UploadCoordinator;
pub use types::{IngestionError, IngestionSettings};
