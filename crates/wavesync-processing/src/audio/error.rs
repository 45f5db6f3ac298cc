use thiserror::Error;

/// Why a duration could not be determined.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Timed out: {0}")]
    Timeout(&'static str),

    #[error("file too large")]
    TooLarge,

    #[error("No duration found in metadata")]
    NoDuration,

    #[error("Unsupported or corrupt audio: {0}")]
    Parse(String),

    #[error("Probe task failed: {0}")]
    Task(String),
}
