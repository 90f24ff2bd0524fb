//! Server lifecycle controller.
//!
//! One [`UploadServer`] owns the HTTP listener and the retention sweeper.
//! `start` and `stop` are idempotent; the upload directory is purged on both
//! edges so no artifact outlives a service incarnation.

use std::net::SocketAddr;
use std::sync::Arc;

use filestage_core::{AppError, Config};
use filestage_storage::ScratchDir;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, OnceCell};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::setup::routes::build_router;
use crate::state::AppState;
use crate::sweeper::RetentionSweeper;

static SHARED: OnceCell<Arc<UploadServer>> = OnceCell::const_new();

struct RunningTasks {
    local_addr: SocketAddr,
    cancel: CancellationToken,
    listener: JoinHandle<()>,
    sweeper: JoinHandle<()>,
}

/// The upload service instance: configuration, scratch directory handle, and
/// (while running) the listener and sweeper tasks.
pub struct UploadServer {
    state: Arc<AppState>,
    running: Mutex<Option<RunningTasks>>,
}

impl UploadServer {
    /// Process-wide construction guard: the first call initializes and stores
    /// the instance; every later call returns the same handle untouched,
    /// ignoring its `config` argument.
    pub async fn shared(config: Config) -> Result<Arc<Self>, AppError> {
        SHARED
            .get_or_try_init(|| async { Self::initialize(config).await.map(Arc::new) })
            .await
            .cloned()
    }

    /// Build an unshared instance. Ensures the upload directory exists;
    /// failure to do so is fatal.
    pub async fn initialize(config: Config) -> Result<Self, AppError> {
        let state = AppState::new(config);
        state
            .scratch
            .ensure()
            .await
            .map_err(|e| AppError::Initialization(e.to_string()))?;

        tracing::info!(
            upload_dir = %state.scratch.root().display(),
            max_upload_mb = state.config.max_upload_size_mb(),
            "Upload server initialized"
        );

        Ok(UploadServer {
            state: Arc::new(state),
            running: Mutex::new(None),
        })
    }

    pub fn scratch(&self) -> &ScratchDir {
        &self.state.scratch
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Start the listener and the retention sweeper in the background.
    /// Idempotent: when already running, returns the bound address without
    /// touching anything. Before accepting the first request the upload
    /// directory is purged, discarding artifacts of a prior incarnation.
    ///
    /// A bind failure is fatal and surfaced to the caller.
    pub async fn start(&self) -> Result<SocketAddr, AppError> {
        let mut running = self.running.lock().await;
        if let Some(tasks) = running.as_ref() {
            tracing::debug!("start() called while already running");
            return Ok(tasks.local_addr);
        }

        match self.state.scratch.purge_all().await {
            Ok(removed) => {
                tracing::info!(removed, "Cleared upload directory before start")
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to clear upload directory before start")
            }
        }

        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.server_port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Initialization(format!("cannot bind {}: {}", addr, e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| AppError::Initialization(e.to_string()))?;

        let cancel = CancellationToken::new();

        let serve_cancel = cancel.clone();
        let service = build_router(self.state.clone())
            .into_make_service_with_connect_info::<SocketAddr>();
        let listener_task = tokio::spawn(async move {
            let shutdown = async move { serve_cancel.cancelled().await };
            if let Err(e) = axum::serve(listener, service)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!(error = %e, "Upload listener terminated unexpectedly");
            }
        });

        let sweeper_task =
            RetentionSweeper::new(self.state.scratch.clone()).spawn(cancel.clone());

        tracing::info!(
            addr = %local_addr,
            max_upload_mb = self.state.config.max_upload_size_mb(),
            "Upload server started"
        );

        *running = Some(RunningTasks {
            local_addr,
            cancel,
            listener: listener_task,
            sweeper: sweeper_task,
        });
        Ok(local_addr)
    }

    /// Stop the listener and the sweeper, then purge the upload directory.
    /// Idempotent: a no-op when not running.
    ///
    /// In-flight uploads are not aborted; graceful shutdown waits for them.
    /// An upload still streaming when the process dies instead may leave a
    /// partial file, which the next `start`'s purge removes.
    pub async fn stop(&self) {
        let mut running = self.running.lock().await;
        let Some(tasks) = running.take() else {
            tracing::debug!("stop() called while not running");
            return;
        };

        tasks.cancel.cancel();
        if let Err(e) = tasks.listener.await {
            tracing::error!(error = %e, "Upload listener task failed during shutdown");
        }
        if let Err(e) = tasks.sweeper.await {
            tracing::error!(error = %e, "Retention sweeper task failed during shutdown");
        }

        match self.state.scratch.purge_all().await {
            Ok(removed) => tracing::info!(removed, "Cleared upload directory on stop"),
            Err(e) => tracing::error!(error = %e, "Failed to clear upload directory on stop"),
        }

        tracing::info!("Upload server stopped");
    }
}
