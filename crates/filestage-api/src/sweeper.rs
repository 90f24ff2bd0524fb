//! Background retention sweeper.

use std::time::Duration;

use filestage_core::config::{RETENTION_WINDOW, SWEEP_ERROR_BACKOFF, SWEEP_INTERVAL};
use filestage_storage::ScratchDir;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Recurring task that purges artifacts older than the retention window.
///
/// Each cycle purges, then sleeps for the interval; a failed cycle is logged
/// and shortens the next sleep to the error backoff. The task never
/// propagates an error, and cancellation is observed during the sleep, so
/// shutdown is never delayed by a full interval.
pub struct RetentionSweeper {
    scratch: ScratchDir,
    retention: Duration,
    interval: Duration,
    error_backoff: Duration,
}

impl RetentionSweeper {
    pub fn new(scratch: ScratchDir) -> Self {
        Self::with_schedule(scratch, RETENTION_WINDOW, SWEEP_INTERVAL, SWEEP_ERROR_BACKOFF)
    }

    pub fn with_schedule(
        scratch: ScratchDir,
        retention: Duration,
        interval: Duration,
        error_backoff: Duration,
    ) -> Self {
        RetentionSweeper {
            scratch,
            retention,
            interval,
            error_backoff,
        }
    }

    /// Launch the sweep loop as a background task tied to `cancel`.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    async fn run(self, cancel: CancellationToken) {
        loop {
            let sleep_for = match self.scratch.purge_older_than(self.retention).await {
                Ok(removed) => {
                    if removed > 0 {
                        tracing::info!(removed, "Retention sweep completed");
                    } else {
                        tracing::debug!("Retention sweep completed, nothing to remove");
                    }
                    self.interval
                }
                Err(e) => {
                    tracing::error!(error = %e, "Retention sweep failed, backing off");
                    self.error_backoff
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Retention sweeper cancelled");
                    return;
                }
                _ = tokio::time::sleep(sleep_for) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use tempfile::tempdir;

    fn age_file(path: &std::path::Path, age: Duration) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[tokio::test]
    async fn sweeps_expired_files_and_spares_recent_ones() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("old.csv");
        let young = dir.path().join("young.csv");
        std::fs::write(&old, b"old").unwrap();
        std::fs::write(&young, b"young").unwrap();
        age_file(&old, Duration::from_secs(25 * 3600));
        age_file(&young, Duration::from_secs(23 * 3600));

        let sweeper = RetentionSweeper::with_schedule(
            ScratchDir::new(dir.path()),
            Duration::from_secs(24 * 3600),
            Duration::from_secs(3600),
            Duration::from_secs(3600),
        );
        let cancel = CancellationToken::new();
        let handle = sweeper.spawn(cancel.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!old.exists());
        assert!(young.exists());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop promptly")
            .unwrap();
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_sleep() {
        let dir = tempdir().unwrap();
        let sweeper = RetentionSweeper::with_schedule(
            ScratchDir::new(dir.path()),
            Duration::from_secs(24 * 3600),
            Duration::from_secs(3600),
            Duration::from_secs(3600),
        );
        let cancel = CancellationToken::new();
        let handle = sweeper.spawn(cancel.clone());

        // Let the first sweep finish so the task is mid-sleep.
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("cancellation must not wait out the interval")
            .unwrap();
    }

    #[tokio::test]
    async fn sweep_errors_do_not_kill_the_task() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("not_created_yet");
        let sweeper = RetentionSweeper::with_schedule(
            ScratchDir::new(&missing),
            Duration::from_secs(24 * 3600),
            Duration::from_secs(3600),
            Duration::from_millis(20),
        );
        let cancel = CancellationToken::new();
        let handle = sweeper.spawn(cancel.clone());

        // Several failing cycles elapse; the task must still be alive.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!handle.is_finished());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop promptly")
            .unwrap();
    }
}
