//! Chat header: title, loaded document name and the auth widget.

use crate::auth::Viewer;
use crate::config::AuthConfig;
use crate::ui::components::{BadgeVariant, Button, ButtonSize, ButtonVariant, Icon, badge};
use crate::upload::FileDescriptor;

/// DOM id of the document label.
pub const DOCUMENT_ID: &str = "document-label";

/// Shown in the header until a PDF is accepted.
pub const NO_DOCUMENT_LABEL: &str = "No PDF uploaded";

/// Name of the loaded document, or a placeholder.
#[must_use]
pub fn render_document_label(document: Option<&FileDescriptor>) -> String {
    let (variant, label) = match document {
        Some(file) => (BadgeVariant::Success, file.name()),
        None => (BadgeVariant::Secondary, NO_DOCUMENT_LABEL),
    };
    format!(
        r#"<span id="{DOCUMENT_ID}" class="document-label">{}</span>"#,
        badge(variant, &html_escape::encode_text(label))
    )
}

/// Sign-in/sign-up triggers for signed-out viewers, a sign-out trigger otherwise.
#[must_use]
pub fn render_auth_widget(viewer: Viewer, config: &AuthConfig) -> String {
    let triggers = match viewer {
        Viewer::SignedOut => {
            let sign_in = Button {
                variant: ButtonVariant::Ghost,
                size: ButtonSize::Sm,
                ..Button::default()
            }
            .render_link(&config.sign_in_url, "Sign In");
            let sign_up = Button {
                size: ButtonSize::Sm,
                ..Button::default()
            }
            .render_link(&config.sign_up_url, "Sign Up");
            format!("{sign_in}{sign_up}")
        }
        Viewer::SignedIn => Button {
            variant: ButtonVariant::Outline,
            size: ButtonSize::Sm,
            ..Button::default()
        }
        .render_link(&config.sign_out_url, "Sign Out"),
    };
    format!(r#"<div class="auth-widget">{triggers}</div>"#)
}

#[must_use]
pub fn render_header(
    document: Option<&FileDescriptor>,
    viewer: Viewer,
    auth: &AuthConfig,
) -> String {
    format!(
        r#"<header class="chat-header"><div class="chat-title">{bot}<span>AI Assistant</span></div><div class="chat-header-actions">{document}{auth}</div></header>"#,
        bot = Icon::Bot.render("text-primary"),
        document = render_document_label(document),
        auth = render_auth_widget(viewer, auth),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_label() {
        assert!(render_document_label(None).contains(NO_DOCUMENT_LABEL));

        let file = FileDescriptor::new("Q3 <draft>.pdf", 10, "application/pdf");
        let html = render_document_label(Some(&file));
        assert!(html.contains("Q3 &lt;draft&gt;.pdf"));
        assert!(!html.contains(NO_DOCUMENT_LABEL));
    }

    #[test]
    fn test_auth_widget_triggers() {
        let config = AuthConfig::default();

        let signed_out = render_auth_widget(Viewer::SignedOut, &config);
        assert!(signed_out.contains(r#"href="/sign-in""#));
        assert!(signed_out.contains(r#"href="/sign-up""#));
        assert!(!signed_out.contains("Sign Out"));

        let signed_in = render_auth_widget(Viewer::SignedIn, &config);
        assert!(signed_in.contains(r#"href="/sign-out""#));
        assert!(!signed_in.contains("Sign Up"));
    }
}
