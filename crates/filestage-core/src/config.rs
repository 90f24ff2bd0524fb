//! Configuration module
//!
//! Settings for the upload service, sourced from the environment. The byte
//! ceiling and the upload directory are conventions shared with the embedding
//! dashboard process: the dashboard exposes its configured upload limit as
//! `MAX_UPLOAD_SIZE_MB`, and both sides must resolve the same scratch path.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SERVER_PORT: u16 = 8000;
const DEFAULT_UPLOAD_DIR: &str = "/tmp/filestage_uploads";
const DEFAULT_MAX_UPLOAD_SIZE_MB: u64 = 200;
const DEFAULT_UPLOAD_COOLDOWN_SECS: u64 = 2;

/// How long an artifact may live before the retention sweeper deletes it.
pub const RETENTION_WINDOW: Duration = Duration::from_secs(24 * 3600);
/// Pause between retention sweep cycles.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);
/// Shortened pause after a failed sweep cycle.
pub const SWEEP_ERROR_BACKOFF: Duration = Duration::from_secs(300);
/// Buffered-write granularity when streaming an upload to disk.
pub const WRITE_CHUNK_SIZE: usize = 1024 * 1024;

/// Upload service configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_size_bytes: u64,
    pub upload_cooldown: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let server_port = match env::var("UPLOAD_SERVER_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("invalid UPLOAD_SERVER_PORT '{}': {}", raw, e))?,
            Err(_) => DEFAULT_SERVER_PORT,
        };

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_DIR));

        let max_upload_size_mb = match env::var("MAX_UPLOAD_SIZE_MB") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|e| anyhow::anyhow!("invalid MAX_UPLOAD_SIZE_MB '{}': {}", raw, e))?,
            Err(_) => DEFAULT_MAX_UPLOAD_SIZE_MB,
        };

        let cooldown_secs = match env::var("UPLOAD_COOLDOWN_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|e| anyhow::anyhow!("invalid UPLOAD_COOLDOWN_SECS '{}': {}", raw, e))?,
            Err(_) => DEFAULT_UPLOAD_COOLDOWN_SECS,
        };

        let config = Config {
            server_port,
            upload_dir,
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            upload_cooldown: Duration::from_secs(cooldown_secs),
        };

        tracing::info!(
            max_upload_mb = max_upload_size_mb,
            upload_dir = %config.upload_dir.display(),
            cooldown_secs = cooldown_secs,
            "Upload service configuration resolved"
        );

        Ok(config)
    }

    pub fn max_upload_size_mb(&self) -> u64 {
        self.max_upload_size_bytes / 1024 / 1024
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_port: DEFAULT_SERVER_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_size_bytes: DEFAULT_MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            upload_cooldown: Duration::from_secs(DEFAULT_UPLOAD_COOLDOWN_SECS),
        }
    }
}
