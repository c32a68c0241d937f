//! Error types for the integration crate.
//!
//! - `NotifyError`: approval email delivery
//! - `PublishError`: social platform publishing

use std::fmt;

/// Errors from email delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// Provider rejected the message.
    Rejected { status: u16, detail: String },
    /// Request failed before reaching the provider.
    RequestFailed { reason: String },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { status, detail } => {
                write!(f, "email provider rejected the message ({status}): {detail}")
            }
            Self::RequestFailed { reason } => {
                write!(f, "email request failed: {reason}")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid notifier configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for NotifyError {}

/// Errors from publishing to the social platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Platform credentials are not configured.
    MissingCredentials,
    /// The platform requires an image and none was provided.
    MissingImage,
    /// Media container creation or processing failed.
    ContainerFailed { detail: String },
    /// Media processing did not finish within the polling budget.
    ProcessingTimedOut,
    /// Platform rejected the publish call.
    Rejected { status: u16, detail: String },
    /// Request failed before reaching the platform.
    RequestFailed { reason: String },
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredentials => {
                write!(f, "platform credentials not configured")
            }
            Self::MissingImage => {
                write!(f, "the platform requires an image for each post")
            }
            Self::ContainerFailed { detail } => {
                write!(f, "media container failed: {detail}")
            }
            Self::ProcessingTimedOut => write!(f, "media processing timed out"),
            Self::Rejected { status, detail } => {
                write!(f, "platform rejected the publish call ({status}): {detail}")
            }
            Self::RequestFailed { reason } => {
                write!(f, "publish request failed: {reason}")
            }
        }
    }
}

impl std::error::Error for PublishError {}
