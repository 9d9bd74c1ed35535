pub mod admin;
pub mod auth;
pub mod transactions;
pub mod users;

use axum::response::Json;
use serde_json::json;

/// Health check handler.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info() -> Json<serde_json::Value> {
    Json(json!({
        "name": "tally-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
