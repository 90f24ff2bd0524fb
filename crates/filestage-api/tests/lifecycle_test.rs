//! Server lifecycle integration tests.
//!
//! Run with: `cargo test -p filestage-api --test lifecycle_test`

mod helpers;

use std::time::Duration;

use filestage_api::server::UploadServer;
use helpers::test_config;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn http_get_root(addr: std::net::SocketAddr) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect to server");
    stream
        .write_all(b"GET / HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

#[tokio::test]
async fn start_serves_requests_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let server = UploadServer::initialize(test_config(
        dir.path().to_path_buf(),
        200,
        Duration::from_secs(2),
    ))
    .await
    .unwrap();

    let addr = server.start().await.unwrap();
    let again = server.start().await.unwrap();
    assert_eq!(addr, again);
    assert!(server.is_running().await);

    let response = http_get_root(addr).await;
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("File Upload Server is running"));

    server.stop().await;
}

#[tokio::test]
async fn start_discards_artifacts_of_a_previous_incarnation() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("leftover.csv"), b"stale").unwrap();
    std::fs::write(dir.path().join("partial.json"), b"half").unwrap();

    let server = UploadServer::initialize(test_config(
        dir.path().to_path_buf(),
        200,
        Duration::from_secs(2),
    ))
    .await
    .unwrap();
    server.start().await.unwrap();

    assert!(helpers::files_in_path(dir.path()).is_empty());

    server.stop().await;
}

#[tokio::test]
async fn stop_purges_uploads_and_closes_the_listener() {
    let dir = tempfile::tempdir().unwrap();
    let server = UploadServer::initialize(test_config(
        dir.path().to_path_buf(),
        200,
        Duration::from_secs(2),
    ))
    .await
    .unwrap();
    let addr = server.start().await.unwrap();

    // Simulate a completed upload sitting in the directory.
    std::fs::write(dir.path().join("uploaded.csv"), b"a,b\n1,2\n").unwrap();

    server.stop().await;
    assert!(!server.is_running().await);
    assert!(helpers::files_in_path(dir.path()).is_empty());
    assert!(TcpStream::connect(addr).await.is_err());

    // A second stop is a no-op.
    server.stop().await;
}

#[tokio::test]
async fn initialize_creates_the_upload_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested").join("uploads");

    let server =
        UploadServer::initialize(test_config(nested.clone(), 200, Duration::from_secs(2)))
            .await
            .unwrap();

    assert!(nested.is_dir());
    assert_eq!(server.scratch().root(), nested.as_path());
}

#[tokio::test]
async fn restart_after_stop_works() {
    let dir = tempfile::tempdir().unwrap();
    let server = UploadServer::initialize(test_config(
        dir.path().to_path_buf(),
        200,
        Duration::from_secs(2),
    ))
    .await
    .unwrap();

    let first_addr = server.start().await.unwrap();
    server.stop().await;

    let second_addr = server.start().await.unwrap();
    let response = http_get_root(second_addr).await;
    assert!(response.starts_with("HTTP/1.1 200"));
    // Ephemeral ports differ between incarnations; only liveness matters.
    let _ = first_addr;

    server.stop().await;
}
