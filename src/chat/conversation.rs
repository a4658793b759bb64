//! Conversation snapshots.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::message::{Message, Sender};
use crate::upload::FileDescriptor;

/// Whether the conversation is waiting on a simulated reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatPhase {
    Idle,
    AwaitingReply,
}

/// How a submission made while a reply is still pending is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyOverlap {
    /// Every submission schedules its own reply timer; replies may interleave.
    #[default]
    Concurrent,
    /// Replies are chained: each one lands a full delay after the previous.
    Serialized,
    /// Submissions are silently rejected until the pending reply lands.
    Reject,
}

impl ReplyOverlap {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Concurrent => "concurrent",
            Self::Serialized => "serialized",
            Self::Reject => "reject",
        }
    }
}

/// Immutable snapshot of a conversation.
///
/// Every transition returns a new snapshot with a bumped revision; the
/// transcript only grows.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    draft_input: String,
    pending_replies: usize,
    loaded_document: Option<FileDescriptor>,
    revision: u64,
    last_reply_due: Option<Instant>,
}

impl Conversation {
    /// A fresh transcript holding only the welcome message.
    #[must_use]
    pub fn seeded(welcome_text: &str) -> Self {
        Self {
            messages: vec![Message::bot(welcome_text)],
            draft_input: String::new(),
            pending_replies: 0,
            loaded_document: None,
            revision: 0,
            last_reply_due: None,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[must_use]
    pub fn draft_input(&self) -> &str {
        &self.draft_input
    }

    /// The send button is enabled only for a non-blank draft.
    #[must_use]
    pub fn can_send(&self) -> bool {
        !self.draft_input.trim().is_empty()
    }

    #[must_use]
    pub fn pending_replies(&self) -> usize {
        self.pending_replies
    }

    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.pending_replies > 0
    }

    #[must_use]
    pub fn phase(&self) -> ChatPhase {
        if self.is_typing() {
            ChatPhase::AwaitingReply
        } else {
            ChatPhase::Idle
        }
    }

    #[must_use]
    pub fn loaded_document(&self) -> Option<&FileDescriptor> {
        self.loaded_document.as_ref()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// "Questions Asked" counter.
    #[must_use]
    pub fn questions_asked(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.sender() == Sender::User)
            .count()
    }

    /// "PDFs Loaded" counter.
    #[must_use]
    pub fn pdfs_loaded(&self) -> usize {
        usize::from(self.loaded_document.is_some())
    }

    pub(crate) fn last_reply_due(&self) -> Option<Instant> {
        self.last_reply_due
    }

    pub(crate) fn with_draft(&self, draft: String) -> Self {
        Self {
            draft_input: draft,
            revision: self.revision + 1,
            ..self.clone()
        }
    }

    /// Append a user message. `queued_reply` is the due time of its reply
    /// when replies are serialized; later submissions queue behind it.
    pub(crate) fn with_user_message(&self, message: Message, queued_reply: Option<Instant>) -> Self {
        let mut next = self.appended(message);
        next.draft_input.clear();
        next.pending_replies += 1;
        if queued_reply.is_some() {
            next.last_reply_due = queued_reply;
        }
        next
    }

    pub(crate) fn with_bot_reply(&self, message: Message) -> Self {
        let mut next = self.appended(message);
        next.pending_replies = next.pending_replies.saturating_sub(1);
        next
    }

    pub(crate) fn with_document(&self, document: FileDescriptor) -> Self {
        Self {
            loaded_document: Some(document),
            revision: self.revision + 1,
            ..self.clone()
        }
    }

    fn appended(&self, message: Message) -> Self {
        let mut next = self.clone();
        next.messages.push(message);
        next.revision += 1;
        next
    }
}
