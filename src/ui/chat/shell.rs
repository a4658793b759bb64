//! Right-hand chat panel.

use chrono::FixedOffset;

use super::{render_header, render_input_area, render_transcript};
use crate::auth::Viewer;
use crate::chat::Conversation;
use crate::config::AuthConfig;

/// Header, scrollable transcript and input, stacked.
#[must_use]
pub fn render_chat_panel(
    conversation: &Conversation,
    offset: &FixedOffset,
    viewer: Viewer,
    auth: &AuthConfig,
) -> String {
    format!(
        r#"<section class="chat-panel">{header}<div id="transcript-scroll" class="transcript-scroll">{transcript}</div>{input}</section>"#,
        header = render_header(conversation.loaded_document(), viewer, auth),
        transcript = render_transcript(conversation, offset),
        input = render_input_area(conversation),
    )
}
