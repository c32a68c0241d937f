//! The timer loop that fires daily generation.

use crate::schedule::{DailySchedule, local_day_bounds};
use chrono::Local;
use postloop_workflow::{PostStore, WorkflowController};
use std::sync::Arc;

/// Fires `WorkflowController::start()` once per day at the scheduled local
/// time.
///
/// The day guard reads the store rather than remembering the last firing,
/// so a process restart near the trigger time does not produce a second
/// post for the same calendar day.
pub struct DailyTrigger {
    schedule: DailySchedule,
    controller: Arc<WorkflowController>,
    store: Arc<dyn PostStore>,
}

impl DailyTrigger {
    /// Creates a trigger over the given schedule and collaborators.
    #[must_use]
    pub fn new(
        schedule: DailySchedule,
        controller: Arc<WorkflowController>,
        store: Arc<dyn PostStore>,
    ) -> Self {
        Self {
            schedule,
            controller,
            store,
        }
    }

    /// Runs the trigger loop forever. Spawn this as a task.
    pub async fn run(self) {
        tracing::info!(
            hour = self.schedule.hour,
            minute = self.schedule.minute,
            "daily trigger armed"
        );
        loop {
            let now = Local::now();
            let next = self.schedule.next_after(now);
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::debug!(next = %next, "sleeping until next scheduled run");
            tokio::time::sleep(wait).await;

            self.fire().await;
        }
    }

    /// One scheduled firing: skip if today already has a record, otherwise
    /// start a generation attempt.
    async fn fire(&self) {
        let (from, to) = local_day_bounds(Local::now());
        match self.store.exists_created_between(from, to).await {
            Ok(true) => {
                tracing::info!("a post already exists for today; skipping scheduled run");
                return;
            }
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(error = %err, "day guard query failed; skipping scheduled run");
                return;
            }
        }

        match self.controller.start().await {
            Ok(record) => {
                tracing::info!(id = %record.id, state = %record.state, "scheduled generation finished");
            }
            Err(err) => {
                tracing::warn!(error = %err, "scheduled generation failed");
            }
        }
    }
}
