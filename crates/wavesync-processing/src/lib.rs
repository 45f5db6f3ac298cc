//! WaveSync media processing
//!
//! Duration extraction for remote audio. Nothing here decodes or transcodes audio;
//! container and codec headers are read just far enough to learn the duration.

pub mod audio;

pub use audio::{AudioMetadataExtractor, DurationProbe, ProbeError};
