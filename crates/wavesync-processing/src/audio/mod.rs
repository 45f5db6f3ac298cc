//! Audio metadata extraction

pub mod error;
mod parse;
pub mod probe;
mod source;

pub use error::ProbeError;
pub use probe::{AudioMetadataExtractor, DurationProbe};
