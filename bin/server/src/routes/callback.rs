//! Approval callback and preview endpoints.
//!
//! These are the links the approver clicks from the email. Every handler
//! rehydrates all context from the store; the callback is a fresh request
//! in a different lifetime from the generation that sent the email.

use crate::pages;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use postloop_core::PostId;
use postloop_workflow::{ControllerError, PostState, Resolution, ResolveAction};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

/// Query parameters for callback links.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    #[serde(default)]
    token: String,
}

/// `GET /approve/{id}?token=...`
pub async fn approve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> (StatusCode, Html<String>) {
    resolve(&state, &id, &query.token, ResolveAction::Approve).await
}

/// `GET /reject/{id}?token=...`
pub async fn reject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> (StatusCode, Html<String>) {
    resolve(&state, &id, &query.token, ResolveAction::Reject).await
}

async fn resolve(
    state: &AppState,
    raw_id: &str,
    token: &str,
    action: ResolveAction,
) -> (StatusCode, Html<String>) {
    let Ok(id) = PostId::from_str(raw_id) else {
        return (StatusCode::NOT_FOUND, Html(pages::not_found_page()));
    };

    match state.controller.resolve(id, action, token).await {
        Ok(resolution) => resolution_page(&resolution),
        Err(ControllerError::Unauthorized) => {
            (StatusCode::UNAUTHORIZED, Html(pages::auth_failure_page()))
        }
        Err(ControllerError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, Html(pages::not_found_page()))
        }
        Err(err) => {
            tracing::error!(error = %err, id = %id, "resolve failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::result_page(
                    "Something went wrong",
                    "The decision could not be recorded. Please try again.",
                    "#c62828",
                )),
            )
        }
    }
}

fn resolution_page(resolution: &Resolution) -> (StatusCode, Html<String>) {
    let record = &resolution.record;
    let theme = pages::escape(&record.theme);

    let html = if resolution.transitioned {
        match record.state {
            PostState::Published => pages::result_page(
                "Post published",
                &format!(
                    "The post has been approved and published.<br><br>\
                     <em>Theme: {theme}</em><br>\
                     <em>Platform post id: {}</em>",
                    pages::escape(record.platform_post_id.as_deref().unwrap_or("unknown")),
                ),
                "#2e7d32",
            ),
            PostState::PublishFailed => pages::result_page(
                "Approved, but publishing failed",
                &format!(
                    "The approval was recorded, but publishing failed: {}<br>\
                     An operator can re-trigger publishing manually.",
                    pages::escape(record.error_detail.as_deref().unwrap_or("unknown error")),
                ),
                "#c62828",
            ),
            PostState::Rejected => pages::result_page(
                "Post rejected",
                &format!(
                    "The post has been rejected and will not be published.<br><br>\
                     <em>Rejected theme: {theme}</em>"
                ),
                "#c62828",
            ),
            // A transition out of AwaitingApproval only lands in the
            // three states above.
            _ => pages::result_page("Decision recorded", "", "#2e7d32"),
        }
    } else {
        settled_page(record.state)
    };

    (StatusCode::OK, Html(html))
}

/// Page for a record that was already settled when the click arrived.
fn settled_page(state: PostState) -> String {
    match state {
        PostState::Published => pages::result_page(
            "Already published",
            "This post has already been published.",
            "#2e7d32",
        ),
        PostState::Approved => pages::result_page(
            "Already approved",
            "This post has already been approved.",
            "#2e7d32",
        ),
        PostState::PublishFailed => pages::result_page(
            "Already decided",
            "This post was approved earlier, but publishing failed. \
             An operator can re-trigger publishing manually.",
            "#f57c00",
        ),
        PostState::Rejected => pages::result_page(
            "Previously rejected",
            "This post was already rejected. Generate a new one if needed.",
            "#f57c00",
        ),
        PostState::GenerationFailed => pages::result_page(
            "Nothing to review",
            "Generation failed for this post; there is no draft to decide on.",
            "#999999",
        ),
        PostState::PendingGeneration | PostState::AwaitingApproval => pages::result_page(
            "Not ready",
            "This post is not ready for a decision yet.",
            "#999999",
        ),
    }
}

/// `GET /preview/{id}?token=...`: browser preview of the draft.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> (StatusCode, Html<String>) {
    let Ok(id) = PostId::from_str(&id) else {
        return (StatusCode::NOT_FOUND, Html(pages::not_found_page()));
    };
    if !state.controller.verify_token(id, &query.token) {
        return (StatusCode::UNAUTHORIZED, Html(pages::auth_failure_page()));
    }

    match state.store.get(id).await {
        Ok(Some(record)) => {
            let token = state.controller.action_token(id);
            let approve_url = format!("/approve/{id}?token={token}");
            let reject_url = format!("/reject/{id}?token={token}");
            (
                StatusCode::OK,
                Html(pages::preview_page(&record, &approve_url, &reject_url)),
            )
        }
        Ok(None) => (StatusCode::NOT_FOUND, Html(pages::not_found_page())),
        Err(err) => {
            tracing::error!(error = %err, id = %id, "preview fetch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::result_page(
                    "Something went wrong",
                    "The post could not be loaded. Please try again.",
                    "#c62828",
                )),
            )
        }
    }
}
