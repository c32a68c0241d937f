//! Controller-level error types.
//!
//! Collaborator failures are not controller errors: they are recorded on
//! the post record and reflected in its state. The controller only errors
//! when the request itself is bad (authorization, unknown id) or the store
//! fails.

use crate::store::StoreError;
use postloop_core::PostId;
use std::fmt;

/// Errors from the workflow controller entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The presented action token does not match the record.
    Unauthorized,
    /// No record with the given id.
    NotFound { id: PostId },
    /// A store operation failed.
    Store(StoreError),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "action token mismatch"),
            Self::NotFound { id } => write!(f, "post not found: {id}"),
            Self::Store(err) => write!(f, "store failure: {err}"),
        }
    }
}

impl std::error::Error for ControllerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ControllerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => Self::NotFound { id },
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_store_error_maps_to_not_found() {
        let id = PostId::new();
        let err = ControllerError::from(StoreError::NotFound { id });
        assert_eq!(err, ControllerError::NotFound { id });
    }

    #[test]
    fn display_forms() {
        assert!(ControllerError::Unauthorized.to_string().contains("token"));
        let err = ControllerError::Store(StoreError::Backend {
            reason: "connection reset".to_string(),
        });
        assert!(err.to_string().contains("connection reset"));
    }
}
