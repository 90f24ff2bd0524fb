//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use bytes::Bytes;
use filestage_api::setup::routes::build_router;
use filestage_api::state::AppState;
use filestage_core::Config;
use tempfile::TempDir;

pub const BOUNDARY: &str = "filestage-test-boundary-7349";

pub struct TestApp {
    pub server: TestServer,
    pub upload_dir: TempDir,
}

pub fn test_config(upload_dir: PathBuf, max_upload_mb: u64, cooldown: Duration) -> Config {
    Config {
        server_port: 0,
        upload_dir,
        max_upload_size_bytes: max_upload_mb * 1024 * 1024,
        upload_cooldown: cooldown,
    }
}

/// Spin up the router over a real HTTP transport (so peer addresses are
/// populated for the rate limiter) against a fresh scratch directory.
pub fn spawn_app(max_upload_mb: u64, cooldown: Duration) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("create scratch dir");
    let config = test_config(upload_dir.path().to_path_buf(), max_upload_mb, cooldown);
    let state = Arc::new(AppState::new(config));
    let service = build_router(state).into_make_service_with_connect_info::<SocketAddr>();
    let server = TestServer::builder()
        .http_transport()
        .build(service)
        .expect("start test server");
    TestApp { server, upload_dir }
}

/// Build a multipart/form-data body with a single field named `file`.
pub fn multipart_body(filename: &str, content_type: &str, data: &[u8]) -> Bytes {
    multipart_body_with_field("file", filename, content_type, data)
}

pub fn multipart_body_with_field(
    field_name: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Bytes {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Bytes::from(body)
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// Names of regular files currently in the scratch directory.
pub fn files_in(dir: &TempDir) -> Vec<String> {
    files_in_path(dir.path())
}

pub fn files_in_path(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read scratch dir")
        .filter_map(|entry| {
            let entry = entry.ok()?;
            entry
                .file_type()
                .ok()?
                .is_file()
                .then(|| entry.file_name().to_string_lossy().into_owned())
        })
        .collect();
    names.sort();
    names
}
