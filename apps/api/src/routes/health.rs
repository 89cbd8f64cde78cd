use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Liveness check. No auth, no body.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Service is running"
    }))
}
