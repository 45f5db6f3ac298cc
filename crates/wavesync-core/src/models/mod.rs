//! Data models for the application
//!
//! Catalog entries, transient media assets handed to object storage, and
//! probed durations.

mod catalog;
mod duration;
mod media;
mod upload;

pub use catalog::*;
pub use duration::*;
pub use media::*;
pub use upload::*;
