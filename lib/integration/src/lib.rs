//! External collaborators for the postloop pipeline.
//!
//! This crate provides:
//!
//! - **Notifier**: delivers the approval request email (Resend HTTP API)
//! - **Publisher**: pushes approved text to the social platform
//!   (Instagram Graph API)
//!
//! Both are behind trait seams so the workflow core can be exercised with
//! test doubles.

pub mod email;
pub mod error;
pub mod notify;
pub mod publish;

pub use email::ApprovalEmail;
pub use error::{NotifyError, PublishError};
pub use notify::{Notifier, ResendNotifier};
pub use publish::{InstagramPublisher, Publisher};
