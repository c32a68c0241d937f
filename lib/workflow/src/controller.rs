//! The workflow controller: orchestrates record creation, legal
//! transitions, collaborator calls, and store updates.
//!
//! The approval step is deliberately split from the publish step: the
//! `Approved` state is durably recorded before the publish call is
//! attempted, so a network failure while publishing never loses the
//! approver's decision, and at most one publish attempt is ever initiated
//! per approval.

use crate::error::ControllerError;
use crate::record::PostRecord;
use crate::state::PostState;
use crate::store::{PostStore, StoreError};
use crate::theme::ThemeRotation;
use crate::token::ActionTokenSigner;
use postloop_ai::{ContentProducer, PostDraft};
use postloop_core::PostId;
use postloop_integration::{ApprovalEmail, Notifier, Publisher};
use std::str::FromStr;
use std::sync::Arc;

/// The approver's decision, parsed from the callback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveAction {
    /// Approve the draft and publish it.
    Approve,
    /// Reject the draft.
    Reject,
}

impl ResolveAction {
    /// Stable string form, used in callback paths.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl FromStr for ResolveAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ResolveAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of a `resolve` call.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The record after the call.
    pub record: PostRecord,
    /// Whether this call performed the transition out of
    /// `AwaitingApproval`. False when the record was already settled:
    /// repeated clicks observe the settled state without side effects.
    pub transitioned: bool,
}

/// The workflow controller.
pub struct WorkflowController {
    store: Arc<dyn PostStore>,
    producer: Arc<dyn ContentProducer>,
    notifier: Arc<dyn Notifier>,
    publisher: Arc<dyn Publisher>,
    rotation: ThemeRotation,
    signer: ActionTokenSigner,
    base_url: String,
    default_image_url: Option<String>,
}

impl WorkflowController {
    /// Creates a controller over the given collaborators.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn PostStore>,
        producer: Arc<dyn ContentProducer>,
        notifier: Arc<dyn Notifier>,
        publisher: Arc<dyn Publisher>,
        rotation: ThemeRotation,
        signer: ActionTokenSigner,
        base_url: impl Into<String>,
        default_image_url: Option<String>,
    ) -> Self {
        Self {
            store,
            producer,
            notifier,
            publisher,
            rotation,
            signer,
            base_url: base_url.into(),
            default_image_url,
        }
    }

    /// Derives the action token for a record.
    #[must_use]
    pub fn action_token(&self, id: PostId) -> String {
        self.signer.sign(id)
    }

    /// Verifies a presented action token.
    #[must_use]
    pub fn verify_token(&self, id: PostId, token: &str) -> bool {
        self.signer.verify(id, token)
    }

    /// Starts a generation attempt: picks the next theme, creates the
    /// record, invokes the producer, and on success requests approval.
    ///
    /// Collaborator failures do not error; they are recorded on the
    /// returned record (`GenerationFailed`, or `error_detail` for a
    /// delivery failure).
    ///
    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub async fn start(&self) -> Result<PostRecord, ControllerError> {
        let previous = self.store.latest().await?;
        let theme = self
            .rotation
            .next_after(previous.as_ref().map(|r| r.theme.as_str()))
            .clone();

        let mut record = PostRecord::new(&theme.label);
        self.store.create(&record).await?;
        tracing::info!(id = %record.id, theme = %theme.label, "generation started");

        let generated = match self.producer.produce(&theme).await {
            Ok(generated) => generated,
            Err(err) => {
                tracing::warn!(id = %record.id, error = %err, "generation failed");
                record.fail_generation(err.to_string());
                self.store
                    .update(&record, PostState::PendingGeneration)
                    .await?;
                return Ok(record);
            }
        };

        let draft = generated.draft.clone();
        record.complete_generation(generated);
        self.store
            .update(&record, PostState::PendingGeneration)
            .await?;

        self.request_approval(&mut record, &draft).await?;
        Ok(record)
    }

    /// Sends the approval email. A delivery failure is recorded on the
    /// record but does not change its state: the draft stays actionable
    /// from the dashboard.
    async fn request_approval(
        &self,
        record: &mut PostRecord,
        draft: &PostDraft,
    ) -> Result<(), ControllerError> {
        let token = self.signer.sign(record.id);
        let email = ApprovalEmail {
            theme: record.theme.clone(),
            hook: draft.hook.clone(),
            caption: draft.caption.clone(),
            hashtags: draft.hashtags.clone(),
            image_prompt: draft.image_prompt.clone(),
            cta: draft.cta.clone(),
            approve_url: self.action_url("approve", record.id, &token),
            reject_url: self.action_url("reject", record.id, &token),
            preview_url: self.action_url("preview", record.id, &token),
        };

        match self.notifier.send(&email.subject(), &email.render()).await {
            Ok(message_id) => {
                tracing::info!(id = %record.id, message_id = %message_id, "approval requested");
            }
            Err(err) => {
                tracing::warn!(id = %record.id, error = %err, "approval email delivery failed");
                record.error_detail = Some(format!("approval email delivery failed: {err}"));
                self.store
                    .update(record, PostState::AwaitingApproval)
                    .await?;
            }
        }
        Ok(())
    }

    /// Resolves the approver's decision for a record.
    ///
    /// Exactly one transition out of `AwaitingApproval` happens per record;
    /// any later call (a double click, a reused link) is a no-op returning
    /// the settled record.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` on a token mismatch (never a state change),
    /// `NotFound` for an unknown id, or a store error.
    pub async fn resolve(
        &self,
        id: PostId,
        action: ResolveAction,
        token: &str,
    ) -> Result<Resolution, ControllerError> {
        if !self.signer.verify(id, token) {
            return Err(ControllerError::Unauthorized);
        }

        let record = self
            .store
            .get(id)
            .await?
            .ok_or(ControllerError::NotFound { id })?;

        if record.state != PostState::AwaitingApproval {
            return Ok(Resolution {
                record,
                transitioned: false,
            });
        }

        match action {
            ResolveAction::Reject => self.transition_rejected(record).await,
            ResolveAction::Approve => self.transition_approved(record).await,
        }
    }

    async fn transition_rejected(
        &self,
        record: PostRecord,
    ) -> Result<Resolution, ControllerError> {
        let mut updated = record;
        updated.reject();

        match self
            .store
            .update(&updated, PostState::AwaitingApproval)
            .await
        {
            Ok(()) => {
                tracing::info!(id = %updated.id, "post rejected");
                Ok(Resolution {
                    record: updated,
                    transitioned: true,
                })
            }
            Err(StoreError::Conflict { .. }) => self.settled(updated.id).await,
            Err(err) => Err(err.into()),
        }
    }

    async fn transition_approved(
        &self,
        record: PostRecord,
    ) -> Result<Resolution, ControllerError> {
        let mut updated = record;
        updated.approve();

        // The decision must be durable before the publish attempt; winning
        // this compare-and-set is what licenses the single publish call.
        match self
            .store
            .update(&updated, PostState::AwaitingApproval)
            .await
        {
            Ok(()) => {}
            Err(StoreError::Conflict { .. }) => return self.settled(updated.id).await,
            Err(err) => return Err(err.into()),
        }
        tracing::info!(id = %updated.id, "post approved");

        let caption = updated.publish_caption().unwrap_or_default();
        match self
            .publisher
            .publish(&caption, self.default_image_url.as_deref())
            .await
        {
            Ok(platform_post_id) => {
                tracing::info!(id = %updated.id, platform_post_id = %platform_post_id, "post published");
                updated.complete_publish(platform_post_id);
            }
            Err(err) => {
                tracing::warn!(id = %updated.id, error = %err, "publish failed");
                updated.fail_publish(err.to_string());
            }
        }
        self.store.update(&updated, PostState::Approved).await?;

        Ok(Resolution {
            record: updated,
            transitioned: true,
        })
    }

    /// Re-reads a record after losing a decision race; the winner's
    /// transition is reported without re-running side effects.
    async fn settled(&self, id: PostId) -> Result<Resolution, ControllerError> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or(ControllerError::NotFound { id })?;
        Ok(Resolution {
            record,
            transitioned: false,
        })
    }

    fn action_url(&self, action: &str, id: PostId, token: &str) -> String {
        format!(
            "{}/{action}/{id}?token={token}",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPostStore;
    use async_trait::async_trait;
    use postloop_ai::{GeneratedPost, GenerationUsage, ProducerError, Theme};
    use postloop_integration::{NotifyError, PublishError};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProducer {
        fail: bool,
    }

    #[async_trait]
    impl ContentProducer for StubProducer {
        async fn produce(&self, theme: &Theme) -> Result<GeneratedPost, ProducerError> {
            if self.fail {
                return Err(ProducerError::MalformedDraft {
                    reason: "stub failure".to_string(),
                });
            }
            Ok(GeneratedPost {
                draft: PostDraft {
                    hook: "T".to_string(),
                    caption: "T".to_string(),
                    hashtags: format!("#{}", theme.label),
                    ..PostDraft::default()
                },
                usage: GenerationUsage::from_tokens(100, 50, "test-model"),
            })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, subject: &str, html: &str) -> Result<String, NotifyError> {
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), html.to_string()));
            Ok("email_1".to_string())
        }
    }

    struct ScriptedPublisher {
        calls: AtomicUsize,
        fail: bool,
    }

    impl ScriptedPublisher {
        fn succeeding() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Publisher for ScriptedPublisher {
        async fn publish(
            &self,
            _caption: &str,
            _image_url: Option<&str>,
        ) -> Result<String, PublishError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(PublishError::Rejected {
                    status: 400,
                    detail: "content policy".to_string(),
                })
            } else {
                Ok("IG123".to_string())
            }
        }
    }

    struct Harness {
        controller: WorkflowController,
        store: Arc<MemoryPostStore>,
        notifier: Arc<RecordingNotifier>,
        publisher: Arc<ScriptedPublisher>,
    }

    fn harness(producer_fails: bool, publisher: ScriptedPublisher) -> Harness {
        let store = Arc::new(MemoryPostStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let publisher = Arc::new(publisher);
        let controller = WorkflowController::new(
            store.clone(),
            Arc::new(StubProducer {
                fail: producer_fails,
            }),
            notifier.clone(),
            publisher.clone(),
            ThemeRotation::new(vec![
                Theme::new("stress", ""),
                Theme::new("sleep", ""),
            ])
            .unwrap(),
            ActionTokenSigner::new("test-secret"),
            "https://example.com",
            Some("https://example.com/default.jpg".to_string()),
        );
        Harness {
            controller,
            store,
            notifier,
            publisher,
        }
    }

    #[tokio::test]
    async fn start_rotates_theme_and_requests_approval() {
        let h = harness(false, ScriptedPublisher::succeeding());

        // Seed history: the last attempt used "stress".
        let prior = PostRecord::new("stress");
        h.store.create(&prior).await.unwrap();

        let record = h.controller.start().await.expect("start");
        assert_eq!(record.theme, "sleep");
        assert_eq!(record.state, PostState::AwaitingApproval);
        assert_eq!(record.usage.as_ref().unwrap().input_tokens, 100);
        assert_eq!(record.usage.as_ref().unwrap().output_tokens, 50);

        let sent = h.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (subject, html) = &sent[0];
        assert!(subject.contains("sleep"));
        let token = h.controller.action_token(record.id);
        assert!(html.contains(&format!("/approve/{}?token={token}", record.id)));
        assert!(html.contains(&format!("/reject/{}?token={token}", record.id)));
    }

    #[tokio::test]
    async fn generation_failure_is_terminal_and_silent() {
        let h = harness(true, ScriptedPublisher::succeeding());

        let record = h.controller.start().await.expect("start");
        assert_eq!(record.state, PostState::GenerationFailed);
        assert!(record.error_detail.as_ref().unwrap().contains("stub failure"));
        assert!(h.notifier.sent.lock().unwrap().is_empty());

        // Terminal: a valid-token decision on it is a no-op.
        let token = h.controller.action_token(record.id);
        let resolution = h
            .controller
            .resolve(record.id, ResolveAction::Approve, &token)
            .await
            .expect("resolve");
        assert!(!resolution.transitioned);
        assert_eq!(resolution.record.state, PostState::GenerationFailed);
        assert_eq!(h.publisher.call_count(), 0);
    }

    #[tokio::test]
    async fn approve_publishes_and_stores_platform_id() {
        let h = harness(false, ScriptedPublisher::succeeding());
        let record = h.controller.start().await.expect("start");
        let token = h.controller.action_token(record.id);

        let resolution = h
            .controller
            .resolve(record.id, ResolveAction::Approve, &token)
            .await
            .expect("resolve");

        assert!(resolution.transitioned);
        assert_eq!(resolution.record.state, PostState::Published);
        assert_eq!(
            resolution.record.platform_post_id.as_deref(),
            Some("IG123")
        );
        assert!(resolution.record.decided_at.is_some());
        assert_eq!(h.publisher.call_count(), 1);
    }

    #[tokio::test]
    async fn repeated_approve_is_a_noop() {
        let h = harness(false, ScriptedPublisher::succeeding());
        let record = h.controller.start().await.expect("start");
        let token = h.controller.action_token(record.id);

        h.controller
            .resolve(record.id, ResolveAction::Approve, &token)
            .await
            .expect("first resolve");
        let second = h
            .controller
            .resolve(record.id, ResolveAction::Approve, &token)
            .await
            .expect("second resolve");

        assert!(!second.transitioned);
        assert_eq!(second.record.state, PostState::Published);
        assert_eq!(h.publisher.call_count(), 1);
    }

    #[tokio::test]
    async fn reject_never_publishes_and_sticks() {
        let h = harness(false, ScriptedPublisher::succeeding());
        let record = h.controller.start().await.expect("start");
        let token = h.controller.action_token(record.id);

        let rejection = h
            .controller
            .resolve(record.id, ResolveAction::Reject, &token)
            .await
            .expect("reject");
        assert!(rejection.transitioned);
        assert_eq!(rejection.record.state, PostState::Rejected);

        // A later approve with a valid token is a no-op returning Rejected.
        let late = h
            .controller
            .resolve(record.id, ResolveAction::Approve, &token)
            .await
            .expect("late approve");
        assert!(!late.transitioned);
        assert_eq!(late.record.state, PostState::Rejected);
        assert_eq!(h.publisher.call_count(), 0);
    }

    #[tokio::test]
    async fn invalid_token_never_changes_state() {
        let h = harness(false, ScriptedPublisher::succeeding());
        let record = h.controller.start().await.expect("start");

        let err = h
            .controller
            .resolve(record.id, ResolveAction::Approve, "forged-token")
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::Unauthorized);

        let stored = h.store.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.state, PostState::AwaitingApproval);
        assert_eq!(h.publisher.call_count(), 0);
    }

    #[tokio::test]
    async fn token_for_another_record_is_rejected() {
        let h = harness(false, ScriptedPublisher::succeeding());
        let first = h.controller.start().await.expect("start");
        let second = h.controller.start().await.expect("start");

        let err = h
            .controller
            .resolve(
                first.id,
                ResolveAction::Approve,
                &h.controller.action_token(second.id),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::Unauthorized);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let h = harness(false, ScriptedPublisher::succeeding());
        let id = PostId::new();
        let token = h.controller.action_token(id);

        let err = h
            .controller
            .resolve(id, ResolveAction::Approve, &token)
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::NotFound { id });
    }

    #[tokio::test]
    async fn publish_failure_keeps_the_decision() {
        let h = harness(false, ScriptedPublisher::failing());
        let record = h.controller.start().await.expect("start");
        let token = h.controller.action_token(record.id);

        let resolution = h
            .controller
            .resolve(record.id, ResolveAction::Approve, &token)
            .await
            .expect("resolve");

        assert!(resolution.transitioned);
        assert_eq!(resolution.record.state, PostState::PublishFailed);
        assert!(resolution.record.decided_at.is_some());
        assert!(
            resolution
                .record
                .error_detail
                .as_ref()
                .unwrap()
                .contains("content policy")
        );
        assert_eq!(h.publisher.call_count(), 1);
    }

    #[tokio::test]
    async fn racing_resolves_publish_exactly_once() {
        let h = harness(false, ScriptedPublisher::succeeding());
        let record = h.controller.start().await.expect("start");
        let token = h.controller.action_token(record.id);

        let (a, b) = tokio::join!(
            h.controller
                .resolve(record.id, ResolveAction::Approve, &token),
            h.controller
                .resolve(record.id, ResolveAction::Approve, &token),
        );
        let (a, b) = (a.expect("resolve a"), b.expect("resolve b"));

        assert_eq!(h.publisher.call_count(), 1);
        assert_eq!(
            u32::from(a.transitioned) + u32::from(b.transitioned),
            1,
            "exactly one caller performs the transition"
        );

        let stored = h.store.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.state, PostState::Published);
    }
}
