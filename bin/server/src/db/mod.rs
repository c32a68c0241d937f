//! Database repositories for the postloop server.
//!
//! The posts table is the only persisted artifact; its repository
//! implements the workflow crate's compare-and-set store contract.

pub mod post;

pub use post::PgPostStore;
