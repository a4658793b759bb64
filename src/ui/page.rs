//! Full page rendering.

use chrono::FixedOffset;

use super::chat::render_chat_panel;
use super::components::Icon;
use super::stats::render_stats;
use super::upload::render_upload_panel;
use crate::auth::Viewer;
use crate::chat::Conversation;
use crate::config::AuthConfig;
use crate::upload::UploadState;

/// Everything needed to render the page for one session.
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a> {
    pub session_id: &'a str,
    pub conversation: &'a Conversation,
    pub upload: &'a UploadState,
    /// Upload size limit shown in the drop zone hint.
    pub max_file_size: usize,
    pub offset: &'a FixedOffset,
    pub viewer: Viewer,
    pub auth: &'a AuthConfig,
}

/// Generate the HTML shell for the application.
#[must_use]
pub fn html_shell(title: &str, session_id: &str, content: &str) -> String {
    let title = html_escape::encode_text(title);
    let session_id = html_escape::encode_double_quoted_attribute(session_id);
    format!(
        r#"<!DOCTYPE html>
<html lang="en" class="dark">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Chat with your PDF documents">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/app.css">
    <script defer src="/static/app.js"></script>
</head>
<body data-session-id="{session_id}">
    <div id="app-shell" class="app-shell">
        {content}
    </div>
</body>
</html>"#
    )
}

fn render_side_panel(view: &PageView<'_>) -> String {
    format!(
        r#"<aside class="side-panel"><div class="brand"><div class="brand-title">{icon}<h1>PDF Assistant</h1></div><p class="tagline">Upload your document and unlock AI-powered insights instantly</p></div>{upload}{stats}</aside>"#,
        icon = Icon::FileText.render("icon-md text-primary"),
        upload = render_upload_panel(view.upload, view.max_file_size),
        stats = render_stats(view.conversation),
    )
}

/// Render the two-panel page.
#[must_use]
pub fn render_page(view: &PageView<'_>) -> String {
    let content = format!(
        "{side}{chat}",
        side = render_side_panel(view),
        chat = render_chat_panel(view.conversation, view.offset, view.viewer, view.auth),
    );
    html_shell("PDF Assistant", view.session_id, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_page() {
        let conversation = Conversation::seeded("Welcome! Upload your PDF to start chatting.");
        let upload = UploadState::default();
        let offset = FixedOffset::east_opt(0).unwrap();
        let auth = AuthConfig::default();
        let html = render_page(&PageView {
            session_id: "abc-123",
            conversation: &conversation,
            upload: &upload,
            max_file_size: 10 * 1024 * 1024,
            offset: &offset,
            viewer: Viewer::SignedOut,
            auth: &auth,
        });

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"data-session-id="abc-123""#));
        assert!(html.contains("PDF Assistant"));
        assert!(html.contains("AI Assistant"));
        assert!(html.contains("No PDF uploaded"));
        assert!(html.contains("Welcome! Upload your PDF to start chatting."));
        assert!(html.contains("Questions Asked"));
        assert!(html.contains("Sign Up"));
        assert!(html.contains("Maximum file size: 10.0 MB"));
    }
}
