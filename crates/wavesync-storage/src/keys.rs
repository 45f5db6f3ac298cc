//! Shared key generation for storage backends.
//!
//! Key format: `{folder}/{uuid}.{ext}`, folder without leading or trailing slashes.

use crate::{StorageError, StorageResult};
use uuid::Uuid;

/// Generate a unique storage key inside `folder`.
pub fn generate_storage_key(folder: &str, extension: &str) -> StorageResult<String> {
    let folder = validate_folder(folder)?;
    let extension = extension.trim_start_matches('.');
    if folder.is_empty() {
        Ok(format!("{}.{}", Uuid::new_v4(), extension))
    } else {
        Ok(format!("{}/{}.{}", folder, Uuid::new_v4(), extension))
    }
}

/// Trim slashes and reject traversal.
pub fn validate_folder(folder: &str) -> StorageResult<&str> {
    let trimmed = folder.trim_matches('/');
    if trimmed.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(format!(
            "Folder contains a parent reference: {}",
            folder
        )));
    }
    Ok(trimmed)
}
