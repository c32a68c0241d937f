//! The post record: one row per generation attempt.

use crate::state::PostState;
use chrono::{DateTime, Utc};
use postloop_core::PostId;
use postloop_ai::{GeneratedPost, GenerationUsage, PostDraft};
use serde::{Deserialize, Serialize};

/// A post record, the unit of state tracked by the workflow.
///
/// Records are created when a generation attempt starts, mutated by the
/// workflow controller at each stage transition, and never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Unique identifier, immutable after creation.
    pub id: PostId,
    /// Theme label this attempt was generated for.
    pub theme: String,
    /// Current lifecycle state.
    pub state: PostState,
    /// The structured draft; unset until the producer succeeds.
    pub draft: Option<PostDraft>,
    /// Token usage and cost; set once when generation succeeds.
    pub usage: Option<GenerationUsage>,
    /// Platform post id; unset until published.
    pub platform_post_id: Option<String>,
    /// Detail of the most recent collaborator failure.
    pub error_detail: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the approver decided; unset until approved or rejected.
    pub decided_at: Option<DateTime<Utc>>,
    /// When the publish call succeeded.
    pub published_at: Option<DateTime<Utc>>,
}

impl PostRecord {
    /// Creates a new record in `PendingGeneration`.
    #[must_use]
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            id: PostId::new(),
            theme: theme.into(),
            state: PostState::PendingGeneration,
            draft: None,
            usage: None,
            platform_post_id: None,
            error_detail: None,
            created_at: Utc::now(),
            decided_at: None,
            published_at: None,
        }
    }

    /// Stores the generated draft and moves to `AwaitingApproval`.
    ///
    /// Usage is write-once: a value already present is kept.
    pub fn complete_generation(&mut self, generated: GeneratedPost) {
        self.draft = Some(generated.draft);
        if self.usage.is_none() {
            self.usage = Some(generated.usage);
        }
        self.state = PostState::AwaitingApproval;
    }

    /// Records a producer failure and moves to the terminal
    /// `GenerationFailed`.
    pub fn fail_generation(&mut self, error: impl Into<String>) {
        self.error_detail = Some(error.into());
        self.state = PostState::GenerationFailed;
    }

    /// Records the approval decision.
    pub fn approve(&mut self) {
        self.state = PostState::Approved;
        self.decided_at = Some(Utc::now());
    }

    /// Records the rejection decision. Terminal.
    pub fn reject(&mut self) {
        self.state = PostState::Rejected;
        self.decided_at = Some(Utc::now());
    }

    /// Stores the platform post id and moves to `Published`.
    pub fn complete_publish(&mut self, platform_post_id: impl Into<String>) {
        self.platform_post_id = Some(platform_post_id.into());
        self.published_at = Some(Utc::now());
        self.state = PostState::Published;
    }

    /// Records a publish failure and moves to the terminal `PublishFailed`.
    pub fn fail_publish(&mut self, error: impl Into<String>) {
        self.error_detail = Some(error.into());
        self.state = PostState::PublishFailed;
    }

    /// The caption as published: caption body plus the hashtags line.
    #[must_use]
    pub fn publish_caption(&self) -> Option<String> {
        self.draft.as_ref().map(|draft| {
            if draft.hashtags.is_empty() {
                draft.caption.clone()
            } else {
                format!("{}\n\n{}", draft.caption, draft.hashtags)
            }
        })
    }
}
