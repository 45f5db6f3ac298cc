//! Shared constants for ingestion and reconciliation.

/// Cover URL assigned when an upload carries no cover image.
pub const PLACEHOLDER_COVER_URL: &str = "https://via.placeholder.com/300";

/// Historic default duration written by earlier ingestion code.
///
/// Entries still carrying this value are treated as unverified and re-probed.
pub const PLACEHOLDER_DURATION_SECS: u64 = 180;

pub const DEFAULT_AUDIO_FOLDER: &str = "wavesync/audio";
pub const DEFAULT_COVER_FOLDER: &str = "wavesync/covers";

/// Per-file upload ceiling in megabytes.
pub const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 50;

/// Hosts whose audio may be re-fetched whole when ranged probing fails.
pub const DEFAULT_PROBE_FALLBACK_HOST: &str = "cloudinary.com";

/// Byte prefix fetched by the ranged probe (`Range: bytes=0-1048576`).
pub const PROBE_PREFIX_BYTES: u64 = 1_048_576;

/// Ceiling for the in-memory fallback fetch.
pub const PROBE_FALLBACK_MAX_BYTES: usize = 5 * 1024 * 1024;

pub const DEFAULT_RECONCILE_INTERVAL_MS: u64 = 800;

/// Document collection names.
pub const TRACKS_COLLECTION: &str = "tracks";
pub const PODCASTS_COLLECTION: &str = "podcasts";
