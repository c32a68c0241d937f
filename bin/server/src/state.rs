//! Shared application state.

use postloop_workflow::{PostStore, WorkflowController};
use std::sync::Arc;

/// State threaded through every handler.
pub struct AppState {
    /// The workflow controller behind every entry point.
    pub controller: Arc<WorkflowController>,
    /// Read access to the post store for the dashboard.
    pub store: Arc<dyn PostStore>,
    /// Shared secret guarding the manual trigger.
    pub secret_key: String,
    /// How many records the dashboard shows.
    pub dashboard_limit: i64,
}
