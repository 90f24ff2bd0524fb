//! Streaming multipart upload handler.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::extract::multipart::Field;
use axum::extract::{ConnectInfo, Multipart, State};
use axum::Json;
use filestage_core::config::WRITE_CHUNK_SIZE;
use filestage_core::models::round_mb;
use filestage_core::{sanitize_filename, AppError, ContentKind};
use serde::Serialize;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::HttpAppError;
use crate::state::AppState;

/// Success body returned to the upload widget.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub temp_path: String,
    pub file_extension: String,
    pub size_mb: f64,
    pub content_type: String,
}

/// `POST /upload`: stream the `file` multipart field to the shared upload
/// directory.
///
/// The rate limiter is consulted before any body byte is read; its timestamp
/// is recorded only after the file is fully on disk, so a rejected or failed
/// upload never starts a cooldown. Partial files are removed on any failure
/// after the destination was reserved.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let client = addr.ip();
    state.rate_limiter.check(client).await?;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart form: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let response = store_upload(&state, client, &mut field).await?;
        return Ok(Json(response));
    }

    Err(AppError::InvalidInput("No file provided".to_string()).into())
}

async fn store_upload(
    state: &AppState,
    client: std::net::IpAddr,
    field: &mut Field<'_>,
) -> Result<UploadResponse, HttpAppError> {
    let original_filename = field
        .file_name()
        .unwrap_or("unknown")
        .to_string();
    let declared_type = field.content_type().map(|s| s.to_string());

    let safe_name = sanitize_filename(&original_filename)?;
    let (dest, file) = state.scratch.reserve(&safe_name).await?;

    let size_bytes =
        match stream_to_file(field, file, state.config.max_upload_size_bytes).await {
            Ok(size) => size,
            Err(err) => {
                remove_partial(&dest).await;
                return Err(err.into());
            }
        };

    state.rate_limiter.record_accepted(client).await;

    let kind = ContentKind::from_path(&dest);
    let content_type = kind.resolve_mime(declared_type.as_deref());
    let file_extension = dest
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();

    tracing::info!(
        client = %client,
        filename = %original_filename,
        stored_as = %dest.display(),
        size_bytes,
        content_type = %content_type,
        "Upload accepted"
    );

    Ok(UploadResponse {
        filename: original_filename,
        temp_path: dest.display().to_string(),
        file_extension,
        size_mb: round_mb(size_bytes),
        content_type,
    })
}

/// Stream the field to disk through a bounded buffer, enforcing the byte
/// ceiling on the running total. The file is flushed and synced before
/// returning, so a success response never refers to an incomplete file.
async fn stream_to_file(
    field: &mut Field<'_>,
    file: tokio::fs::File,
    max_bytes: u64,
) -> Result<u64, AppError> {
    let mut writer = BufWriter::with_capacity(WRITE_CHUNK_SIZE, file);
    let mut written: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read upload stream: {}", e)))?
    {
        written += chunk.len() as u64;
        if written > max_bytes {
            return Err(AppError::PayloadTooLarge { max_bytes });
        }
        writer.write_all(&chunk).await?;
    }

    writer.flush().await?;
    let file = writer.into_inner();
    file.sync_all().await?;

    Ok(written)
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove partial upload"
        );
    }
}
