//! WaveSync Storage Library
//!
//! This crate provides the object storage abstraction and its backends: Cloudinary,
//! S3 (and S3-compatible providers) and the local filesystem.
//!
//! # Storage key format
//!
//! S3 and local backends store objects under `{folder}/{uuid}.{ext}`. Cloudinary assigns
//! its own public id inside the folder; its keys are `{resource_type}/{public_id}` so
//! deletion can address the right resource type.
//!
//! Keys must not contain `..` or a leading `/`.

#[cfg(feature = "storage-cloudinary")]
pub mod cloudinary;
pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-cloudinary")]
pub use cloudinary::CloudinaryStorage;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use wavesync_core::models::{ContentKind, MediaAsset, UploadResult};
pub use wavesync_core::StorageBackend;
