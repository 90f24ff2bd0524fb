//! Domain models: stored artifacts and their coarse content classification.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Coarse classification of an uploaded file, used by the dashboard to pick
/// a preview strategy. Inferred from the file extension first; a
/// client-declared MIME type is consulted only for unrecognized extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Csv,
    Xlsx,
    Gzip,
    Json,
    Unknown,
}

impl ContentKind {
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => ContentKind::Csv,
            "xlsx" => ContentKind::Xlsx,
            "gz" => ContentKind::Gzip,
            "json" => ContentKind::Json,
            _ => ContentKind::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(ContentKind::Unknown)
    }

    /// Canonical MIME type for a known kind.
    pub fn mime_type(&self) -> Option<&'static str> {
        match self {
            ContentKind::Csv => Some("text/csv"),
            ContentKind::Xlsx => {
                Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
            }
            ContentKind::Gzip => Some("application/gzip"),
            ContentKind::Json => Some("application/json"),
            ContentKind::Unknown => None,
        }
    }

    /// MIME type to report for a stored file. Known extensions win over the
    /// declared type; unknown extensions fall back to the declared type, then
    /// to a generic binary type.
    pub fn resolve_mime(&self, declared: Option<&str>) -> String {
        match self.mime_type() {
            Some(mime) => mime.to_string(),
            None => declared
                .filter(|d| !d.is_empty())
                .unwrap_or("application/octet-stream")
                .to_string(),
        }
    }
}

/// Metadata snapshot of one file in the shared upload directory.
///
/// Artifacts are created by completed uploads and never mutated; they
/// disappear when the retention sweeper or a start/stop purge removes the
/// underlying file.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub file_name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
    pub kind: ContentKind,
}

impl Artifact {
    pub fn new(path: PathBuf, size_bytes: u64, modified: SystemTime) -> Self {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let kind = ContentKind::from_path(&path);
        Artifact {
            file_name,
            path,
            size_bytes,
            modified: modified.into(),
            kind,
        }
    }

    /// File size in MiB, rounded to 2 decimals. The same rounding the upload
    /// response reports.
    pub fn size_mb(&self) -> f64 {
        round_mb(self.size_bytes)
    }
}

/// bytes -> MiB rounded to 2 decimals.
pub fn round_mb(bytes: u64) -> f64 {
    (bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_kind_from_known_extensions() {
        assert_eq!(ContentKind::from_extension("csv"), ContentKind::Csv);
        assert_eq!(ContentKind::from_extension("XLSX"), ContentKind::Xlsx);
        assert_eq!(ContentKind::from_extension("gz"), ContentKind::Gzip);
        assert_eq!(ContentKind::from_extension("json"), ContentKind::Json);
        assert_eq!(ContentKind::from_extension("parquet"), ContentKind::Unknown);
    }

    #[test]
    fn extension_wins_over_declared_mime() {
        let kind = ContentKind::from_path(Path::new("/tmp/data.csv"));
        assert_eq!(kind.resolve_mime(Some("application/x-evil")), "text/csv");
    }

    #[test]
    fn unknown_extension_falls_back_to_declared_then_binary() {
        let kind = ContentKind::from_path(Path::new("/tmp/data.bin"));
        assert_eq!(kind.resolve_mime(Some("text/plain")), "text/plain");
        assert_eq!(kind.resolve_mime(None), "application/octet-stream");
    }

    #[test]
    fn size_mb_rounds_to_two_decimals() {
        assert_eq!(round_mb(5 * 1024 * 1024), 5.0);
        assert_eq!(round_mb(1_572_864), 1.5);
        assert_eq!(round_mb(1_234_567), 1.18);
    }

    #[test]
    fn artifact_captures_name_and_kind() {
        let artifact = Artifact::new(
            PathBuf::from("/tmp/uploads/report.json"),
            2048,
            SystemTime::now(),
        );
        assert_eq!(artifact.file_name, "report.json");
        assert_eq!(artifact.kind, ContentKind::Json);
    }
}
