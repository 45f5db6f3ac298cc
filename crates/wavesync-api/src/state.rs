//! Application state shared by all handlers.

use crate::services::upload::UploadCoordinator;

/// Shared behind an `Arc`; holds no request-scoped state.
pub struct AppState {
    pub upload: UploadCoordinator,
}
