//! HTTP routes: the manual trigger, the approval callbacks, the preview,
//! and the read-only dashboard.

pub mod callback;
pub mod dashboard;
pub mod generate;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/generate", post(generate::generate))
        .route("/approve/{id}", get(callback::approve))
        .route("/reject/{id}", get(callback::reject))
        .route("/preview/{id}", get(callback::preview))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/health", get(health))
        .with_state(state)
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "postloop" }))
}
