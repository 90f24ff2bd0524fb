//! Shared scratch directory management.
//!
//! All uploads land in one flat directory. Name reservation is atomic per
//! entry (`create_new`), so concurrent uploads of the same filename cannot
//! clobber each other; purges are best-effort per entry so a single stuck
//! file never aborts a sweep.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filestage_core::Artifact;
use tokio::fs;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to create upload directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to reserve {name} in upload directory: {source}")]
    Reserve {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Handle on the shared upload directory.
#[derive(Clone, Debug)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ScratchDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if absent. Idempotent.
    pub async fn ensure(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: self.root.clone(),
                source,
            })
    }

    /// Reserve a collision-free destination for `safe_name` and open it for
    /// writing. Tries the name as-is, then `name_1.ext`, `name_2.ext`, …
    /// until an unused name is found. `create_new` makes each attempt atomic,
    /// so two concurrent uploads of the same name get distinct files.
    pub async fn reserve(&self, safe_name: &str) -> StorageResult<(PathBuf, fs::File)> {
        let mut counter = 0u32;
        loop {
            let candidate = if counter == 0 {
                safe_name.to_string()
            } else {
                suffixed_name(safe_name, counter)
            };
            let path = self.root.join(&candidate);

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => {
                    if counter > 0 {
                        tracing::debug!(
                            requested = safe_name,
                            stored_as = %candidate,
                            "Filename collision resolved with suffix"
                        );
                    }
                    return Ok((path, file));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    counter += 1;
                }
                Err(source) => {
                    return Err(StorageError::Reserve {
                        name: candidate,
                        source,
                    });
                }
            }
        }
    }

    /// Snapshot of every regular file younger than `max_age`. Recomputed from
    /// filesystem state on each call; enumeration order is not guaranteed.
    pub async fn list_recent(&self, max_age: Duration) -> StorageResult<Vec<Artifact>> {
        let mut artifacts = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "Skipping unreadable directory entry"
                    );
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());
            // A modification time in the future counts as age zero.
            let age = modified.elapsed().unwrap_or(Duration::ZERO);
            if age <= max_age {
                artifacts.push(Artifact::new(entry.path(), metadata.len(), modified));
            }
        }

        Ok(artifacts)
    }

    /// Delete every regular file in the directory. Best-effort: individual
    /// failures are logged and skipped. Returns the number removed.
    pub async fn purge_all(&self) -> StorageResult<usize> {
        self.purge_if(|_| true).await
    }

    /// Delete regular files whose modification time exceeds `age`.
    /// Best-effort per entry. Returns the number removed.
    pub async fn purge_older_than(&self, age: Duration) -> StorageResult<usize> {
        self.purge_if(move |modified| modified.elapsed().map(|a| a > age).unwrap_or(false))
            .await
    }

    async fn purge_if<F>(&self, should_delete: F) -> StorageResult<usize>
    where
        F: Fn(SystemTime) -> bool,
    {
        let mut removed = 0usize;
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable entry during purge");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());
            if !should_delete(modified) {
                continue;
            }

            match fs::remove_file(&path).await {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "Deleted file from upload directory");
                    removed += 1;
                }
                Err(e) => {
                    tracing::error!(
                        path = %path.display(),
                        error = %e,
                        "Failed to delete file, continuing purge"
                    );
                }
            }
        }

        Ok(removed)
    }
}

/// `data.csv` + 2 -> `data_2.csv`; extensionless names get a bare suffix.
fn suffixed_name(name: &str, counter: u32) -> String {
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, counter, ext),
        None => format!("{}_{}", name, counter),
    }
}
