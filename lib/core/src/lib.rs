//! Core domain types and utilities for the postloop pipeline.
//!
//! This crate provides the foundational identifier types and the error
//! handling base shared by the generation, approval, and publishing crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ParseIdError, PostId};
