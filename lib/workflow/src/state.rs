//! Lifecycle states for a post record.
//!
//! Transitions are monotonic and one-directional; a record never re-enters
//! a prior state. Legality is encoded here and enforced at the store through
//! compare-and-set updates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a post record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostState {
    /// Created; the producer has not returned yet.
    PendingGeneration,
    /// Draft stored; waiting for the approver's decision.
    AwaitingApproval,
    /// Approver said yes; the publish attempt follows.
    Approved,
    /// Live on the platform.
    Published,
    /// Approved, but the publish attempt failed. Terminal; an operator
    /// re-triggers manually.
    PublishFailed,
    /// Approver said no. Terminal.
    Rejected,
    /// The producer failed. Terminal; no automatic retry.
    GenerationFailed,
}

impl PostState {
    /// Stable string form, used for persistence and display.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingGeneration => "pending_generation",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Approved => "approved",
            Self::Published => "published",
            Self::PublishFailed => "publish_failed",
            Self::Rejected => "rejected",
            Self::GenerationFailed => "generation_failed",
        }
    }

    /// Parses the stable string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_generation" => Some(Self::PendingGeneration),
            "awaiting_approval" => Some(Self::AwaitingApproval),
            "approved" => Some(Self::Approved),
            "published" => Some(Self::Published),
            "publish_failed" => Some(Self::PublishFailed),
            "rejected" => Some(Self::Rejected),
            "generation_failed" => Some(Self::GenerationFailed),
            _ => None,
        }
    }

    /// Returns true if this is a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Published | Self::PublishFailed | Self::Rejected | Self::GenerationFailed
        )
    }

    /// Returns true if the approver's decision has been recorded.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        matches!(
            self,
            Self::Approved | Self::Published | Self::PublishFailed | Self::Rejected
        )
    }

    /// Returns true if moving to `next` is a legal forward transition.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::PendingGeneration, Self::AwaitingApproval)
                | (Self::PendingGeneration, Self::GenerationFailed)
                | (Self::AwaitingApproval, Self::Approved)
                | (Self::AwaitingApproval, Self::Rejected)
                | (Self::Approved, Self::Published)
                | (Self::Approved, Self::PublishFailed)
        )
    }
}

impl fmt::Display for PostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PostState; 7] = [
        PostState::PendingGeneration,
        PostState::AwaitingApproval,
        PostState::Approved,
        PostState::Published,
        PostState::PublishFailed,
        PostState::Rejected,
        PostState::GenerationFailed,
    ];

    #[test]
    fn string_form_roundtrips() {
        for state in ALL {
            assert_eq!(PostState::parse(state.as_str()), Some(state));
        }
        assert_eq!(PostState::parse("bogus"), None);
    }

    #[test]
    fn terminal_states() {
        assert!(PostState::Published.is_terminal());
        assert!(PostState::PublishFailed.is_terminal());
        assert!(PostState::Rejected.is_terminal());
        assert!(PostState::GenerationFailed.is_terminal());
        assert!(!PostState::PendingGeneration.is_terminal());
        assert!(!PostState::AwaitingApproval.is_terminal());
        assert!(!PostState::Approved.is_terminal());
    }

    #[test]
    fn legal_transitions_only_move_forward() {
        use PostState::*;

        assert!(PendingGeneration.can_transition_to(AwaitingApproval));
        assert!(PendingGeneration.can_transition_to(GenerationFailed));
        assert!(AwaitingApproval.can_transition_to(Approved));
        assert!(AwaitingApproval.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Published));
        assert!(Approved.can_transition_to(PublishFailed));

        // No state may be re-entered.
        for from in ALL {
            assert!(!from.can_transition_to(from));
        }
        // Terminal states go nowhere.
        for from in ALL.into_iter().filter(PostState::is_terminal) {
            for to in ALL {
                assert!(!from.can_transition_to(to));
            }
        }
        // No path skips the approval decision.
        assert!(!PendingGeneration.can_transition_to(Approved));
        assert!(!PendingGeneration.can_transition_to(Published));
        assert!(!AwaitingApproval.can_transition_to(Published));
    }
}
