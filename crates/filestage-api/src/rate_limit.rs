//! Per-client upload cooldown tracking.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use filestage_core::AppError;
use tokio::sync::Mutex;

/// Tracks, per client address, when its last upload was accepted.
///
/// The check and the recording are deliberately separate operations: the
/// handler checks before reading any body bytes and records only after the
/// upload completed, so a rejected or failed upload never starts a cooldown.
/// Entries are never evicted; the map grows with the number of distinct
/// client addresses observed.
#[derive(Clone)]
pub struct UploadRateLimiter {
    cooldown: Duration,
    last_accepted: Arc<Mutex<HashMap<IpAddr, Instant>>>,
}

impl UploadRateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        UploadRateLimiter {
            cooldown,
            last_accepted: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Fails with `RateLimitExceeded` when the client's previous accepted
    /// upload is younger than the cooldown. Does not mutate state.
    pub async fn check(&self, client: IpAddr) -> Result<(), AppError> {
        let last_accepted = self.last_accepted.lock().await;
        if let Some(accepted_at) = last_accepted.get(&client) {
            if accepted_at.elapsed() < self.cooldown {
                return Err(AppError::RateLimitExceeded {
                    client: client.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Record that an upload from `client` completed now.
    pub async fn record_accepted(&self, client: IpAddr) {
        self.last_accepted
            .lock()
            .await
            .insert(client, Instant::now());
    }
}
