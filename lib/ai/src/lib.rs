//! Content generation for the postloop pipeline.
//!
//! This crate provides the Content Producer collaborator:
//!
//! - **LLM backend**: a unified interface over language-model providers,
//!   with an Anthropic Messages API implementation
//! - **Post generator**: turns a theme into a structured post draft with
//!   token usage and cost accounting

pub mod anthropic;
pub mod backend;
pub mod error;
pub mod producer;
pub mod style;

pub use anthropic::AnthropicBackend;
pub use backend::{LlmBackend, LlmRequest, LlmResponse, TokenUsage};
pub use error::{LlmError, ProducerError};
pub use producer::{ContentProducer, GeneratedPost, GenerationUsage, PostDraft, PostGenerator, Theme};
