//! The conversation state machine.
//!
//! `idle` → (non-blank submit) → `awaiting_reply` → (reply timer) → `idle`.
//! The reply is canned text; nothing is sent to any model.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::Instant;

use super::conversation::{Conversation, ReplyOverlap};
use super::message::Message;
use crate::config::ChatConfig;
use crate::scheduler::{StateCell, TaskScope};
use crate::upload::FileDescriptor;

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The user message that was appended.
    Accepted(Message),
    /// Nothing changed.
    Rejected(Rejection),
}

/// Why a submission left the conversation untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Input was empty after trimming.
    Blank,
    /// A reply is pending and the overlap policy is [`ReplyOverlap::Reject`].
    AwaitingReply,
    /// The owning page session was torn down.
    Disposed,
}

impl Rejection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::AwaitingReply => "awaiting_reply",
            Self::Disposed => "disposed",
        }
    }
}

impl Submission {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Owns the transcript, draft input and typing state of one page session.
#[derive(Debug, Clone)]
pub struct ConversationController {
    inner: Arc<ControllerInner>,
}

#[derive(Debug)]
struct ControllerInner {
    state: StateCell<Conversation>,
    scope: TaskScope,
    config: ChatConfig,
}

impl ConversationController {
    /// Create a controller seeded with the welcome message. Reply timers are
    /// spawned from `scope`.
    #[must_use]
    pub fn new(config: ChatConfig, scope: &TaskScope) -> Self {
        let state = StateCell::new(Conversation::seeded(&config.welcome_text), scope);
        Self {
            inner: Arc::new(ControllerInner {
                state,
                scope: scope.clone(),
                config,
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<Conversation> {
        self.inner.state.get()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Conversation>> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn reply_overlap(&self) -> ReplyOverlap {
        self.inner.config.reply_overlap
    }

    /// Replace the draft input.
    pub fn set_draft(&self, draft: impl Into<String>) -> Arc<Conversation> {
        let draft = draft.into();
        self.inner
            .state
            .update(|c| (c.draft_input() != draft).then(|| c.with_draft(draft)))
            .unwrap_or_else(|| self.snapshot())
    }

    /// Submit the current draft.
    pub fn submit(&self) -> Submission {
        self.submit_with(None)
    }

    /// Submit `input` as if it had been typed into the draft field.
    pub fn submit_input(&self, input: impl Into<String>) -> Submission {
        self.submit_with(Some(input.into()))
    }

    /// Record the document reported by the upload control.
    pub fn attach_document(&self, document: FileDescriptor) {
        self.inner
            .state
            .update(|c| Some(c.with_document(document)));
    }

    pub(crate) fn seal(&self) {
        self.inner.state.seal();
    }

    fn submit_with(&self, input: Option<String>) -> Submission {
        let config = &self.inner.config;
        let now = Instant::now();
        let mut outcome = Submission::Rejected(Rejection::Disposed);
        let mut reply_due = None;

        self.inner.state.update(|conversation| {
            let text = input.as_deref().unwrap_or(conversation.draft_input());
            if text.trim().is_empty() {
                outcome = Submission::Rejected(Rejection::Blank);
                return None;
            }
            if config.reply_overlap == ReplyOverlap::Reject && conversation.is_typing() {
                outcome = Submission::Rejected(Rejection::AwaitingReply);
                return None;
            }

            let due = match config.reply_overlap {
                ReplyOverlap::Serialized => {
                    conversation.last_reply_due().map_or(now, |d| d.max(now))
                        + config.reply_delay()
                }
                ReplyOverlap::Concurrent | ReplyOverlap::Reject => now + config.reply_delay(),
            };
            let message = Message::user(text);
            outcome = Submission::Accepted(message.clone());
            reply_due = Some(due);
            let queued = (config.reply_overlap == ReplyOverlap::Serialized).then_some(due);
            Some(conversation.with_user_message(message, queued))
        });

        match (&outcome, reply_due) {
            (Submission::Accepted(message), Some(due)) => {
                tracing::info!(
                    name: "chat.submitted",
                    message_id = %message.id(),
                    text_length = message.text().len(),
                    overlap = config.reply_overlap.as_str(),
                    "User message appended"
                );
                self.schedule_reply(due);
            }
            (Submission::Rejected(reason), _) => {
                tracing::debug!(reason = reason.as_str(), "Submission rejected");
            }
            (Submission::Accepted(_), None) => {}
        }
        outcome
    }

    fn schedule_reply(&self, due: Instant) {
        let controller = self.clone();
        self.inner
            .scope
            .schedule_at(due, move || controller.deliver_reply());
    }

    fn deliver_reply(&self) {
        let text = self.inner.config.reply_text.as_str();
        if let Some(conversation) = self
            .inner
            .state
            .update(|c| Some(c.with_bot_reply(Message::bot(text))))
        {
            tracing::info!(
                name: "chat.reply.appended",
                transcript_len = conversation.len(),
                pending_replies = conversation.pending_replies(),
                "Simulated reply appended"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatPhase, Sender};
    use std::time::Duration;

    fn controller(overlap: ReplyOverlap) -> (ConversationController, TaskScope) {
        let scope = TaskScope::new();
        let config = ChatConfig {
            reply_overlap: overlap,
            ..ChatConfig::default()
        };
        (ConversationController::new(config, &scope), scope)
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_then_reply() {
        let (chat, _scope) = controller(ReplyOverlap::Concurrent);
        assert_eq!(chat.snapshot().len(), 1);

        chat.set_draft("What is this about?");
        let outcome = chat.submit();
        assert!(outcome.is_accepted());

        let now = chat.snapshot();
        assert_eq!(now.len(), 2);
        assert_eq!(now.draft_input(), "");
        assert_eq!(now.phase(), ChatPhase::AwaitingReply);
        assert_eq!(now.messages()[1].text(), "What is this about?");

        tokio::time::sleep(Duration::from_millis(1199)).await;
        assert_eq!(chat.snapshot().len(), 2);

        tokio::time::sleep(Duration::from_millis(2)).await;
        let after = chat.snapshot();
        assert_eq!(after.len(), 3);
        assert_eq!(after.messages()[2].sender(), Sender::Bot);
        assert_eq!(after.messages()[2].text(), ChatConfig::default().reply_text);
        assert_eq!(after.phase(), ChatPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_submission_is_rejected() {
        let (chat, scope) = controller(ReplyOverlap::Concurrent);

        for input in ["", "   ", "\n\t "] {
            assert_eq!(
                chat.submit_input(input),
                Submission::Rejected(Rejection::Blank)
            );
        }
        assert_eq!(chat.snapshot().len(), 1);
        assert_eq!(chat.snapshot().revision(), 0);
        assert_eq!(scope.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_is_kept_verbatim() {
        let (chat, _scope) = controller(ReplyOverlap::Concurrent);
        chat.submit_input("  padded question  ");
        assert_eq!(chat.snapshot().messages()[1].text(), "  padded question  ");
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_overlap_replies_independently() {
        let (chat, _scope) = controller(ReplyOverlap::Concurrent);
        chat.submit_input("first");
        tokio::time::sleep(Duration::from_millis(600)).await;
        chat.submit_input("second");

        tokio::time::sleep(Duration::from_millis(601)).await;
        let snap = chat.snapshot();
        assert_eq!(snap.len(), 4);
        assert!(snap.is_typing());

        tokio::time::sleep(Duration::from_millis(600)).await;
        let snap = chat.snapshot();
        assert_eq!(snap.len(), 5);
        assert!(!snap.is_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_queue_tracked_only_when_serialized() {
        for overlap in [ReplyOverlap::Concurrent, ReplyOverlap::Reject] {
            let (chat, _scope) = controller(overlap);
            chat.submit_input("first");
            assert_eq!(chat.snapshot().last_reply_due(), None);
        }

        let (chat, _scope) = controller(ReplyOverlap::Serialized);
        chat.submit_input("first");
        assert!(chat.snapshot().last_reply_due().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_serialized_overlap_chains_replies() {
        let (chat, _scope) = controller(ReplyOverlap::Serialized);
        chat.submit_input("first");
        chat.submit_input("second");

        tokio::time::sleep(Duration::from_millis(1201)).await;
        assert_eq!(chat.snapshot().len(), 4);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(chat.snapshot().len(), 4);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(chat.snapshot().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reject_overlap_drops_second_submission() {
        let (chat, _scope) = controller(ReplyOverlap::Reject);
        assert!(chat.submit_input("first").is_accepted());
        assert_eq!(
            chat.submit_input("second"),
            Submission::Rejected(Rejection::AwaitingReply)
        );

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(chat.snapshot().len(), 3);
        assert!(chat.submit_input("third").is_accepted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disposed_controller_never_replies() {
        let (chat, scope) = controller(ReplyOverlap::Concurrent);
        chat.submit_input("hello");
        scope.dispose();
        chat.seal();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(chat.snapshot().len(), 2);
        assert_eq!(
            chat.submit_input("again"),
            Submission::Rejected(Rejection::Disposed)
        );
    }

    #[tokio::test]
    async fn test_attach_document() {
        let (chat, _scope) = controller(ReplyOverlap::Concurrent);
        chat.attach_document(FileDescriptor::new("report.pdf", 2048, "application/pdf"));
        let snap = chat.snapshot();
        assert_eq!(snap.loaded_document().unwrap().name(), "report.pdf");
        assert_eq!(snap.pdfs_loaded(), 1);
    }
}
