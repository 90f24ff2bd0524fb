//! Application state shared across request handlers.

use filestage_core::Config;
use filestage_storage::ScratchDir;

use crate::rate_limit::UploadRateLimiter;

/// State handed to every handler via axum's `State` extractor, wrapped in an
/// `Arc` by the router builder.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub scratch: ScratchDir,
    pub rate_limiter: UploadRateLimiter,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let scratch = ScratchDir::new(&config.upload_dir);
        let rate_limiter = UploadRateLimiter::new(config.upload_cooldown);
        AppState {
            config,
            scratch,
            rate_limiter,
        }
    }
}
