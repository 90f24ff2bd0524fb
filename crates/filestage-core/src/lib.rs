//! Filestage Core Library
//!
//! Shared domain types for the upload session service: configuration,
//! the error taxonomy, artifact metadata, and filename sanitization.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, LogLevel};
pub use models::{Artifact, ContentKind};
pub use validation::sanitize_filename;
