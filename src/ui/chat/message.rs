//! Single message rendering.

use chrono::{DateTime, FixedOffset, Utc};

use crate::chat::Sender;

/// Format `timestamp` as `HH:MM` on the viewer's clock.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>, offset: &FixedOffset) -> String {
    timestamp.with_timezone(offset).format("%H:%M").to_string()
}

/// Render one transcript entry.
///
/// Pure: the same inputs always produce the same markup. User messages sit on
/// the right, bot messages on the left. `text` is escaped and keeps its line
/// breaks.
#[must_use]
pub fn render_message(
    sender: Sender,
    text: &str,
    timestamp: DateTime<Utc>,
    offset: &FixedOffset,
) -> String {
    let (row, bubble) = match sender {
        Sender::User => ("message message-user", "bubble bubble-user"),
        Sender::Bot => ("message message-bot", "bubble bubble-bot"),
    };
    let time = format_timestamp(timestamp, offset);
    format!(
        r#"<div class="{row}" data-sender="{sender}"><div class="{bubble}"><p>{text}</p></div><time class="message-time" datetime="{iso}">{time}</time></div>"#,
        sender = sender.as_str(),
        text = html_escape::encode_text(text),
        iso = timestamp.to_rfc3339(),
    )
}
