//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Upper bound on simultaneously handled requests.
const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Headroom above the byte ceiling for multipart framing, so the streaming
/// handler reaches the ceiling first and can answer 413 with a proper detail
/// body instead of the framework's bare rejection.
const MULTIPART_FRAMING_SLACK: usize = 1024 * 1024;

/// Assemble the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_size_bytes as usize + MULTIPART_FRAMING_SLACK;

    // The widget is served into a dashboard iframe on another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root::root))
        .route(
            "/upload",
            get(handlers::upload_page::upload_page).post(handlers::upload::upload_file),
        )
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
