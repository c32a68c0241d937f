//! The read-only dashboard.

use crate::pages;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use std::sync::Arc;

/// `GET /dashboard`: all records, newest first.
pub async fn dashboard(State(state): State<Arc<AppState>>) -> (StatusCode, Html<String>) {
    match state.store.list(None, state.dashboard_limit).await {
        Ok(records) => {
            let rows: Vec<_> = records
                .into_iter()
                .map(|record| {
                    let token = state.controller.action_token(record.id);
                    let preview_url = format!("/preview/{}?token={token}", record.id);
                    (record, preview_url)
                })
                .collect();
            (StatusCode::OK, Html(pages::dashboard_page(&rows)))
        }
        Err(err) => {
            tracing::error!(error = %err, "dashboard query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::result_page(
                    "Something went wrong",
                    "The dashboard could not be loaded. Please try again.",
                    "#c62828",
                )),
            )
        }
    }
}
