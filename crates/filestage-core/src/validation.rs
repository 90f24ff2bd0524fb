//! Filename sanitization for untrusted, client-supplied names.

use std::path::Path;

use crate::error::AppError;

const MAX_FILENAME_LENGTH: usize = 255;

/// Reduce a client-supplied filename to a bare name safe to join onto the
/// upload directory: directory components are stripped, whitespace becomes
/// `_`, and anything outside alphanumerics, `.`, `-`, `_` is dropped.
///
/// A name with no substantive characters left (empty, or only dots, dashes
/// and underscores, e.g. `..`) is rejected rather than defaulted.
pub fn sanitize_filename(raw: &str) -> Result<String, AppError> {
    let base = Path::new(raw)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let sanitized: String = base
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .filter_map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();

    if sanitized.chars().all(|c| matches!(c, '.' | '-' | '_')) {
        return Err(AppError::InvalidFilename(raw.to_string()));
    }

    Ok(sanitized)
}
