//! Error types module
//!
//! All request- and lifecycle-level failures are unified under [`AppError`].
//! Each variant knows its HTTP status, the message safe to show a client,
//! and the level it should be logged at, so the HTTP layer can render every
//! failure as a structured `{"detail": ...}` body without per-site logic.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected client errors (rate limits, bad filenames)
    Debug,
    /// Recoverable resource issues (oversized payloads)
    Warn,
    /// Unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("rate limit exceeded for client {client}")]
    RateLimitExceeded { client: String },

    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("payload exceeds {max_bytes} byte ceiling")]
    PayloadTooLarge { max_bytes: u64 },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("initialization failed: {0}")]
    Initialization(String),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl AppError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::RateLimitExceeded { .. } => 429,
            AppError::InvalidFilename(_) => 400,
            AppError::InvalidInput(_) => 400,
            AppError::PayloadTooLarge { .. } => 413,
            AppError::Internal(_) => 500,
            AppError::Initialization(_) => 500,
        }
    }

    /// Message rendered to the client. Matches what the upload widget
    /// displays verbatim, so wording changes are contract changes.
    pub fn client_detail(&self) -> String {
        match self {
            AppError::RateLimitExceeded { .. } => "Too many uploads. Please wait.".to_string(),
            AppError::InvalidFilename(name) => {
                format!("Filename '{}' cannot be stored safely", name)
            }
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::PayloadTooLarge { max_bytes } => format!(
                "File too large. Maximum size is {}MB",
                max_bytes / 1024 / 1024
            ),
            AppError::Internal(msg) => msg.clone(),
            AppError::Initialization(msg) => msg.clone(),
        }
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            AppError::RateLimitExceeded { .. } => LogLevel::Debug,
            AppError::InvalidFilename(_) => LogLevel::Debug,
            AppError::InvalidInput(_) => LogLevel::Debug,
            AppError::PayloadTooLarge { .. } => LogLevel::Warn,
            AppError::Internal(_) => LogLevel::Error,
            AppError::Initialization(_) => LogLevel::Error,
        }
    }
}
