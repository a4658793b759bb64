//! Transcript fragment.

use chrono::FixedOffset;

use super::message::render_message;
use crate::chat::Conversation;

/// DOM id of the transcript container.
pub const TRANSCRIPT_ID: &str = "transcript";

const TYPING_INDICATOR: &str = concat!(
    r#"<div class="message message-bot" id="typing-indicator" aria-label="Assistant is typing">"#,
    r#"<div class="bubble bubble-bot typing">"#,
    r#"<span class="dot"></span>"#,
    r#"<span class="dot" style="animation-delay: 150ms"></span>"#,
    r#"<span class="dot" style="animation-delay: 300ms"></span>"#,
    "</div></div>",
);

/// Render the whole transcript, the typing indicator when a reply is pending,
/// and the anchor the client scrolls to after every swap.
#[must_use]
pub fn render_transcript(conversation: &Conversation, offset: &FixedOffset) -> String {
    let messages: String = conversation
        .messages()
        .iter()
        .map(|m| render_message(m.sender(), m.text(), m.timestamp(), offset))
        .collect();
    let typing = if conversation.is_typing() {
        TYPING_INDICATOR
    } else {
        ""
    };

    format!(
        r#"<div id="{TRANSCRIPT_ID}" class="transcript" data-revision="{revision}" data-scroll="latest" aria-live="polite" aria-label="Chat messages">{messages}{typing}<div id="chat-end"></div></div>"#,
        revision = conversation.revision(),
    )
}
