//! Inline SVG icons.
//!
//! Icons are rendered inline so fragments pushed over SSE carry everything
//! they need.

use std::fmt::Write;

/// Common icon size class.
const ICON_SIZE: &str = "icon";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Upload,
    FileText,
    Loader,
    Check,
    Sparkles,
    Send,
    Bot,
    User,
}

impl Icon {
    fn body(self) -> &'static str {
        match self {
            Self::Upload => concat!(
                r#"<path d="M21 15v4a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2v-4" />"#,
                r#"<polyline points="17 8 12 3 7 8" />"#,
                r#"<line x1="12" y1="3" x2="12" y2="15" />"#,
            ),
            Self::FileText => concat!(
                r#"<path d="M14 2H6a2 2 0 0 0-2 2v16a2 2 0 0 0 2 2h12a2 2 0 0 0 2-2V8z" />"#,
                r#"<polyline points="14 2 14 8 20 8" />"#,
                r#"<line x1="16" y1="13" x2="8" y2="13" />"#,
                r#"<line x1="16" y1="17" x2="8" y2="17" />"#,
            ),
            Self::Loader => r#"<path d="M21 12a9 9 0 1 1-6.219-8.56" />"#,
            Self::Check => r#"<polyline points="20 6 9 17 4 12" />"#,
            Self::Sparkles => concat!(
                r#"<path d="m12 3-1.912 5.813a2 2 0 0 1-1.275 1.275L3 12l5.813 1.912a2 2 0 0 1 1.275 1.275L12 21l1.912-5.813a2 2 0 0 1 1.275-1.275L21 12l-5.813-1.912a2 2 0 0 1-1.275-1.275L12 3Z" />"#,
                r#"<path d="M5 3v4" /><path d="M19 17v4" /><path d="M3 5h4" /><path d="M17 19h4" />"#,
            ),
            Self::Send => concat!(
                r#"<line x1="22" y1="2" x2="11" y2="13" />"#,
                r#"<polygon points="22 2 15 22 11 13 2 9 22 2" />"#,
            ),
            Self::Bot => concat!(
                r#"<rect x="3" y="11" width="18" height="10" rx="2" />"#,
                r#"<circle cx="12" cy="5" r="2" />"#,
                r#"<path d="M12 7v4" />"#,
                r#"<line x1="8" y1="16" x2="8" y2="16" />"#,
                r#"<line x1="16" y1="16" x2="16" y2="16" />"#,
            ),
            Self::User => concat!(
                r#"<path d="M19 21v-2a4 4 0 0 0-4-4H9a4 4 0 0 0-4 4v2" />"#,
                r#"<circle cx="12" cy="7" r="4" />"#,
            ),
        }
    }

    /// Render the icon with extra CSS classes.
    #[must_use]
    pub fn render(self, class: &str) -> String {
        let mut classes = String::from(ICON_SIZE);
        if !class.is_empty() {
            let _ = write!(classes, " {class}");
        }
        if self == Self::Loader {
            classes.push_str(" animate-spin");
        }
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" class="{classes}" aria-hidden="true">{}</svg>"#,
            self.body()
        )
    }
}
