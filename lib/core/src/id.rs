//! Strongly-typed identifier for post records.
//!
//! Post IDs use ULID (Universally Unique Lexicographically Sortable
//! Identifier) format, providing both uniqueness and temporal ordering:
//! sorting by ID is sorting by creation time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse PostId: {}", self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Unique identifier for a post record.
///
/// Displayed as `post_<ulid>`; parsing accepts both the prefixed form and a
/// raw ULID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(Ulid);

/// Display prefix for post IDs.
const PREFIX: &str = "post";

impl PostId {
    /// Creates a new ID with a randomly generated ULID.
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Creates an ID from a ULID.
    #[must_use]
    pub const fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Returns the underlying ULID.
    #[must_use]
    pub const fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", PREFIX, self.0)
    }
}

impl FromStr for PostId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ulid_str = s.strip_prefix("post_").unwrap_or(s);
        Ulid::from_str(ulid_str).map(Self).map_err(|e| ParseIdError {
            reason: e.to_string(),
        })
    }
}

impl From<Ulid> for PostId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl From<PostId> for Ulid {
    fn from(id: PostId) -> Self {
        id.0
    }
}
