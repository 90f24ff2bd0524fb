//! Filestage API Library
//!
//! The upload session service: HTTP handlers, per-client rate limiting, the
//! retention sweeper, and the server lifecycle controller that owns them.

// Module declarations
pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod server;
pub mod setup;
pub mod state;
pub mod sweeper;
pub mod telemetry;

// Re-exports
pub use error::HttpAppError;
pub use rate_limit::UploadRateLimiter;
pub use server::UploadServer;
pub use state::AppState;
pub use sweeper::RetentionSweeper;
