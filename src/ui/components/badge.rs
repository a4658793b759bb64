//! Badge for status indicators.

/// Badge visual variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BadgeVariant {
    #[default]
    Default,
    Success,
    Secondary,
}

impl BadgeVariant {
    /// Get CSS classes for this variant.
    #[must_use]
    pub fn classes(self) -> &'static str {
        match self {
            Self::Default => "badge badge-primary",
            Self::Success => "badge badge-success",
            Self::Secondary => "badge badge-secondary",
        }
    }
}

/// Wrap already-rendered `inner_html` in a badge.
#[must_use]
pub fn badge(variant: BadgeVariant, inner_html: &str) -> String {
    format!(r#"<span class="{}">{inner_html}</span>"#, variant.classes())
}
