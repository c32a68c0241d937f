//! The post record store contract.
//!
//! All mutations are compare-and-set against the expected current state, so
//! the one-directional transition invariant holds under concurrent access
//! without a global lock: unrelated identifiers never contend, and a stale
//! writer gets a conflict instead of silently overwriting.

use crate::record::PostRecord;
use crate::state::PostState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postloop_core::PostId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record with the given id.
    NotFound { id: PostId },
    /// Compare-and-set failed: the record is no longer in the expected
    /// state. The caller must re-fetch and decide.
    Conflict {
        id: PostId,
        expected: PostState,
        actual: PostState,
    },
    /// The backing store failed.
    Backend { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "post not found: {id}"),
            Self::Conflict {
                id,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "post {id} is in state '{actual}', update expected '{expected}'"
                )
            }
            Self::Backend { reason } => write!(f, "store operation failed: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// The post record store.
///
/// Implementations must apply `update` atomically with respect to
/// concurrent `update`/`get` calls on the same identifier.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Inserts a new record.
    async fn create(&self, record: &PostRecord) -> Result<(), StoreError>;

    /// Fetches a record by id.
    async fn get(&self, id: PostId) -> Result<Option<PostRecord>, StoreError>;

    /// Writes `record` if the stored record is still in `expected` state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the stored state no longer
    /// matches `expected`; the stored record is left unchanged.
    async fn update(&self, record: &PostRecord, expected: PostState) -> Result<(), StoreError>;

    /// Lists records, newest first, optionally filtered by state.
    async fn list(
        &self,
        filter: Option<PostState>,
        limit: i64,
    ) -> Result<Vec<PostRecord>, StoreError>;

    /// Returns the most recently created record, if any.
    async fn latest(&self) -> Result<Option<PostRecord>, StoreError>;

    /// Returns true if any record was created in `[from, to)`.
    async fn exists_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}

/// An in-memory store with the same compare-and-set semantics as the
/// durable one. Used by tests and local smoke runs.
#[derive(Default)]
pub struct MemoryPostStore {
    records: Mutex<HashMap<PostId, PostRecord>>,
}

impl MemoryPostStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PostId, PostRecord>> {
        // A poisoned lock means a panic mid-mutation; propagate it.
        self.records.lock().expect("post store lock poisoned")
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn create(&self, record: &PostRecord) -> Result<(), StoreError> {
        let mut records = self.lock();
        if records.contains_key(&record.id) {
            return Err(StoreError::Backend {
                reason: format!("duplicate post id: {}", record.id),
            });
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn get(&self, id: PostId) -> Result<Option<PostRecord>, StoreError> {
        Ok(self.lock().get(&id).cloned())
    }

    async fn update(&self, record: &PostRecord, expected: PostState) -> Result<(), StoreError> {
        let mut records = self.lock();
        let stored = records
            .get_mut(&record.id)
            .ok_or(StoreError::NotFound { id: record.id })?;
        if stored.state != expected {
            return Err(StoreError::Conflict {
                id: record.id,
                expected,
                actual: stored.state,
            });
        }
        *stored = record.clone();
        Ok(())
    }

    async fn list(
        &self,
        filter: Option<PostState>,
        limit: i64,
    ) -> Result<Vec<PostRecord>, StoreError> {
        let records = self.lock();
        let mut matching: Vec<PostRecord> = records
            .values()
            .filter(|r| filter.is_none_or(|state| r.state == state))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        matching.truncate(limit.max(0) as usize);
        Ok(matching)
    }

    async fn latest(&self) -> Result<Option<PostRecord>, StoreError> {
        let records = self.lock();
        Ok(records
            .values()
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn exists_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let records = self.lock();
        Ok(records
            .values()
            .any(|r| r.created_at >= from && r.created_at < to))
    }
}
