//! The authenticated manual generation trigger.

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use postloop_workflow::PostState;
use postloop_workflow::token::constant_time_eq;
use serde_json::json;
use std::sync::Arc;

/// `POST /generate`: starts a generation attempt on demand.
///
/// Guarded by a bearer token matching the configured secret; the
/// comparison is constant-time. Returns the new record's id and state; a
/// collaborator failure is reflected in the state, not a crash.
pub async fn generate(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !authorized(&headers, &state.secret_key) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized" })),
        )
            .into_response();
    }

    match state.controller.start().await {
        Ok(record) => {
            let status = if record.state == PostState::GenerationFailed {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::OK
            };
            (
                status,
                Json(json!({
                    "id": record.id.to_string(),
                    "state": record.state.as_str(),
                    "theme": record.theme,
                    "error": record.error_detail,
                })),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "manual generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

fn authorized(headers: &HeaderMap, secret: &str) -> bool {
    let expected = format!("Bearer {secret}");
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| constant_time_eq(value.as_bytes(), expected.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn bearer_check() {
        assert!(authorized(&headers_with("Bearer s3cret"), "s3cret"));
        assert!(!authorized(&headers_with("Bearer wrong"), "s3cret"));
        assert!(!authorized(&headers_with("s3cret"), "s3cret"));
        assert!(!authorized(&HeaderMap::new(), "s3cret"));
    }
}
