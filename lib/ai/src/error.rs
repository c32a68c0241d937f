//! Error types for the content generation crate.
//!
//! - `LlmError`: low-level LLM backend operations
//! - `ProducerError`: draft generation on top of a backend

use std::fmt;

/// Errors from LLM backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Provider is unavailable.
    ProviderUnavailable { provider: String, reason: String },
    /// Request failed.
    RequestFailed { reason: String },
    /// Response parsing failed.
    ResponseParseFailed { reason: String },
    /// Timeout waiting for response.
    Timeout,
    /// Rate limit exceeded.
    RateLimited { retry_after_secs: Option<u64> },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderUnavailable { provider, reason } => {
                write!(f, "LLM provider '{provider}' unavailable: {reason}")
            }
            Self::RequestFailed { reason } => {
                write!(f, "LLM request failed: {reason}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse LLM response: {reason}")
            }
            Self::Timeout => write!(f, "LLM request timed out"),
            Self::RateLimited { retry_after_secs } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "rate limited, retry after {secs}s")
                } else {
                    write!(f, "rate limited")
                }
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid LLM configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for LlmError {}

/// Errors from draft generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProducerError {
    /// The backend call failed.
    Backend(LlmError),
    /// The model returned output that could not be parsed as a draft.
    MalformedDraft { reason: String },
}

impl fmt::Display for ProducerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(err) => write!(f, "content generation failed: {err}"),
            Self::MalformedDraft { reason } => {
                write!(f, "model returned a malformed draft: {reason}")
            }
        }
    }
}

impl std::error::Error for ProducerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            Self::MalformedDraft { .. } => None,
        }
    }
}

impl From<LlmError> for ProducerError {
    fn from(err: LlmError) -> Self {
        Self::Backend(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_error_display() {
        let err = LlmError::ProviderUnavailable {
            provider: "anthropic".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("anthropic"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn producer_error_wraps_backend() {
        let err = ProducerError::from(LlmError::Timeout);
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn malformed_draft_display() {
        let err = ProducerError::MalformedDraft {
            reason: "missing caption".to_string(),
        };
        assert!(err.to_string().contains("missing caption"));
    }
}
