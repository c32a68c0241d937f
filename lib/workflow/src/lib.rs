//! The approval workflow core for postloop.
//!
//! This crate owns the state machine coupling an at-most-once publish
//! guarantee to a human-in-the-loop callback:
//!
//! - **Post record**: one row per generation attempt, retained forever
//! - **Post store**: the compare-and-set persistence contract
//! - **Action tokens**: signed links the approver clicks
//! - **Theme rotation**: round-robin over the configured theme list
//! - **Workflow controller**: the `start` / `resolve` entry points

pub mod controller;
pub mod error;
pub mod record;
pub mod state;
pub mod store;
pub mod theme;
pub mod token;

pub use controller::{ResolveAction, Resolution, WorkflowController};
pub use error::ControllerError;
pub use record::PostRecord;
pub use state::PostState;
pub use store::{MemoryPostStore, PostStore, StoreError};
pub use theme::{ThemeError, ThemeRotation};
pub use token::ActionTokenSigner;
