use axum::Json;
use serde_json::{json, Value};

/// Liveness probe used by the dashboard to confirm the service is up.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "File Upload Server is running" }))
}
