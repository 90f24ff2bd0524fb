//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`; every failure renders as a
//! `{"detail": "..."}` JSON body so the upload widget can show a message
//! instead of a raw trace. Logging happens here, once, at the level the
//! error variant declares.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use filestage_core::{AppError, LogLevel};
use filestage_storage::StorageError;
use serde::Serialize;

/// Wire shape of every failure response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Wrapper so `IntoResponse` (axum trait) can be implemented for
/// `AppError` (filestage-core type) without violating orphan rules.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(AppError::Internal(err.to_string()))
    }
}

fn log_error(error: &AppError) {
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(error = %error, "Request rejected"),
        LogLevel::Warn => tracing::warn!(error = %error, "Request rejected"),
        LogLevel::Error => tracing::error!(error = %error, "Request failed"),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let error = &self.0;
        log_error(error);

        let status = StatusCode::from_u16(error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(ErrorBody {
            detail: error.client_detail(),
        });

        (status, body).into_response()
    }
}
