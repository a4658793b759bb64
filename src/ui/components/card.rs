//! Card container.

/// Card wrapping already-rendered `children`.
#[must_use]
pub fn card(class: &str, children: &str) -> String {
    if class.is_empty() {
        format!(r#"<div class="card">{children}</div>"#)
    } else {
        format!(r#"<div class="card {class}">{children}</div>"#)
    }
}

/// A small card showing one number and its label.
#[must_use]
pub fn stat_card(id: &str, value: usize, label: &str, value_class: &str) -> String {
    card(
        "stat-card",
        &format!(
            r#"<p id="{id}" class="stat-value {value_class}">{value}</p><p class="stat-label">{}</p>"#,
            html_escape::encode_text(label)
        ),
    )
}
