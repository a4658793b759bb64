//! Conversation state and the simulated reply loop.
//!
//! - [`Message`]: an immutable transcript entry
//! - [`Conversation`]: an immutable snapshot of transcript, draft and typing state
//! - [`ConversationController`]: the `idle` / `awaiting_reply` state machine

mod controller;
mod conversation;
mod message;

pub use controller::{ConversationController, Rejection, Submission};
pub use conversation::{ChatPhase, Conversation, ReplyOverlap};
pub use message::{Message, Sender};
