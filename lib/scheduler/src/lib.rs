//! Daily generation trigger for postloop.
//!
//! This crate provides:
//!
//! - **Daily schedule**: once-per-day local time-of-day evaluation
//! - **Daily trigger**: the timer loop that fires `start()`, skipping days
//!   that already have a record (process-restart tolerance)

pub mod error;
pub mod schedule;
pub mod trigger;

pub use error::ScheduleError;
pub use schedule::{DailySchedule, local_day_bounds};
pub use trigger::DailyTrigger;
