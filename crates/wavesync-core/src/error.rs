//! Request-level error type
//!
//! Each crate keeps its own domain error (storage, document store, probe, ingestion).
//! Where a request fails they are folded into `AppError`, and the HTTP layer renders it
//! through `ErrorMetadata`.

/// Level a failed request is logged at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Client mistakes such as a missing audio part
    Debug,
    /// Oversized payloads
    Warn,
    /// Storage and database failures
    Error,
}

/// How an error is presented to the client.
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Machine-readable code, e.g. `STORAGE_ERROR`
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same request may succeed
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Message placed in the response body
    fn client_message(&self) -> String;

    /// Hide the internal message outside development
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),
}

/// Fixed presentation attributes of one `AppError` variant.
struct Profile {
    status: u16,
    code: &'static str,
    kind: &'static str,
    recoverable: bool,
    sensitive: bool,
    action: Option<&'static str>,
    level: LogLevel,
}

impl AppError {
    fn profile(&self) -> Profile {
        match self {
            AppError::Database(_) => Profile {
                status: 500,
                code: "DATABASE_ERROR",
                kind: "Database",
                recoverable: true,
                sensitive: true,
                action: Some("Retry after a short delay"),
                level: LogLevel::Error,
            },
            AppError::Storage(_) => Profile {
                status: 500,
                code: "STORAGE_ERROR",
                kind: "Storage",
                recoverable: true,
                sensitive: false,
                action: Some("Retry the upload after a short delay"),
                level: LogLevel::Error,
            },
            AppError::InvalidInput(_) => Profile {
                status: 400,
                code: "INVALID_INPUT",
                kind: "InvalidInput",
                recoverable: false,
                sensitive: false,
                action: Some("Check request parameters and try again"),
                level: LogLevel::Debug,
            },
            AppError::NotFound(_) => Profile {
                status: 404,
                code: "NOT_FOUND",
                kind: "NotFound",
                recoverable: false,
                sensitive: false,
                action: None,
                level: LogLevel::Debug,
            },
            AppError::PayloadTooLarge(_) => Profile {
                status: 413,
                code: "PAYLOAD_TOO_LARGE",
                kind: "PayloadTooLarge",
                recoverable: false,
                sensitive: false,
                action: Some("Reduce file size and try again"),
                level: LogLevel::Warn,
            },
        }
    }

    /// Variant name, reported as `error_type` in development responses.
    pub fn error_type(&self) -> &'static str {
        self.profile().kind
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.profile().status
    }

    fn error_code(&self) -> &'static str {
        self.profile().code
    }

    fn is_recoverable(&self) -> bool {
        self.profile().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.profile().action
    }

    fn is_sensitive(&self) -> bool {
        self.profile().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.profile().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to save catalog entry".to_string(),
            AppError::Storage(msg) => format!("Failed to upload media: {}", msg),
            AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_are_sensitive_and_retryable() {
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to save catalog entry");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn storage_errors_carry_cause() {
        let err = AppError::Storage("bucket unreachable".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert!(err.client_message().contains("bucket unreachable"));
        assert!(!err.is_sensitive());
    }

    #[test]
    fn invalid_input_is_a_client_error() {
        let err = AppError::InvalidInput("Audio file is required".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Audio file is required");
        assert_eq!(err.log_level(), LogLevel::Debug);
        assert_eq!(err.error_type(), "InvalidInput");
    }

    #[test]
    fn oversized_payload_maps_to_413() {
        let err = AppError::PayloadTooLarge("audioFile exceeds 50 MB".to_string());
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert_eq!(err.log_level(), LogLevel::Warn);
    }
}
