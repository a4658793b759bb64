//! Chat message input area.

use crate::chat::Conversation;
use crate::ui::components::{Button, ButtonSize, Icon};

/// Input form. The send button starts disabled while the draft is blank;
/// the client keeps it in sync as the viewer types.
#[must_use]
pub fn render_input_area(conversation: &Conversation) -> String {
    let send = Button {
        size: ButtonSize::Icon,
        disabled: !conversation.can_send(),
        button_type: "submit",
        id: Some("send-button"),
        label: Some("Send"),
        ..Button::default()
    }
    .render(&Icon::Send.render(""));

    format!(
        r#"<form id="chat-form" class="chat-input" autocomplete="off"><input id="chat-input" name="message" type="text" class="text-input" placeholder="Ask something about your PDF..." value="{draft}">{send}</form>"#,
        draft = html_escape::encode_double_quoted_attribute(conversation.draft_input()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_disabled_for_blank_draft() {
        let conversation = Conversation::seeded("Welcome!");
        assert!(render_input_area(&conversation).contains("disabled"));

        let drafted = conversation.with_draft(r#"say "hi""#.to_string());
        let html = render_input_area(&drafted);
        assert!(!html.contains("disabled"));
        assert!(html.contains(r#"value="say &quot;hi&quot;""#));
    }
}
