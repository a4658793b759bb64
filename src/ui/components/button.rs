//! Buttons and button-styled links.

use std::fmt::Write;

/// Button visual variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    /// Primary action button.
    #[default]
    Primary,
    /// Subtle ghost button.
    Ghost,
    /// Outline button.
    Outline,
}

impl ButtonVariant {
    #[must_use]
    pub fn classes(self) -> &'static str {
        match self {
            Self::Primary => "btn-primary",
            Self::Ghost => "btn-ghost",
            Self::Outline => "btn-outline",
        }
    }
}

/// Button size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonSize {
    Sm,
    #[default]
    Md,
    /// Icon-only button.
    Icon,
}

impl ButtonSize {
    #[must_use]
    pub fn classes(self) -> &'static str {
        match self {
            Self::Sm => "btn-sm",
            Self::Md => "btn-md",
            Self::Icon => "btn-icon",
        }
    }
}

/// A `<button>` element.
///
/// ```
/// use pdf_assistant::ui::components::{Button, ButtonSize};
///
/// let html = Button {
///     size: ButtonSize::Icon,
///     disabled: true,
///     button_type: "submit",
///     ..Button::default()
/// }
/// .render("&rarr;");
/// assert!(html.contains("disabled"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Button<'a> {
    pub variant: ButtonVariant,
    pub size: ButtonSize,
    pub disabled: bool,
    pub button_type: &'a str,
    pub id: Option<&'a str>,
    pub label: Option<&'a str>,
}

impl Default for Button<'_> {
    fn default() -> Self {
        Self {
            variant: ButtonVariant::Primary,
            size: ButtonSize::Md,
            disabled: false,
            button_type: "button",
            id: None,
            label: None,
        }
    }
}

impl Button<'_> {
    fn classes(&self) -> String {
        format!("btn {} {}", self.variant.classes(), self.size.classes())
    }

    /// Render with already-escaped `children`.
    #[must_use]
    pub fn render(&self, children: &str) -> String {
        let mut attrs = format!(r#"type="{}" class="{}""#, self.button_type, self.classes());
        if let Some(id) = self.id {
            let _ = write!(attrs, r#" id="{id}""#);
        }
        if let Some(label) = self.label {
            let _ = write!(
                attrs,
                r#" aria-label="{}""#,
                html_escape::encode_double_quoted_attribute(label)
            );
        }
        if self.disabled {
            attrs.push_str(" disabled");
        }
        format!("<button {attrs}>{children}</button>")
    }

    /// Render as a link styled like this button.
    #[must_use]
    pub fn render_link(&self, href: &str, children: &str) -> String {
        format!(
            r#"<a href="{}" class="{}">{children}</a>"#,
            html_escape::encode_double_quoted_attribute(href),
            self.classes()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_href_is_escaped() {
        let html = Button::default().render_link(r#"/sign-in?next="x""#, "Sign In");
        assert!(html.contains(r#"href="/sign-in?next=&quot;x&quot;""#));
        assert!(html.contains("btn btn-primary btn-md"));
    }

    #[test]
    fn test_enabled_button_has_no_disabled_attr() {
        let html = Button::default().render("Go");
        assert!(!html.contains("disabled"));
    }
}
