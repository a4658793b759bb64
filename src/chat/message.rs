//! Transcript entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

/// A single chat message.
///
/// Messages are immutable once created: fields are only readable, and the
/// transcript only ever appends new ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    id: String,
    sender: Sender,
    text: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with a fresh id and the current time.
    ///
    /// Callers guarantee `text` is not blank; the controller rejects blank
    /// input before reaching here and config validation covers canned text.
    pub(crate) fn new(sender: Sender, text: impl Into<String>) -> Self {
        let text = text.into();
        debug_assert!(!text.trim().is_empty(), "messages must carry text");
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            text,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub(crate) fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn sender(&self) -> Sender {
        self.sender
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
