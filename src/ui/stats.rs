//! Stats cards under the upload panel.

use crate::chat::Conversation;
use crate::ui::components::stat_card;

/// DOM id of the stats grid.
pub const STATS_ID: &str = "stats";

#[must_use]
pub fn render_stats(conversation: &Conversation) -> String {
    format!(
        r#"<div id="{STATS_ID}" class="stats">{questions}{pdfs}</div>"#,
        questions = stat_card(
            "questions-asked",
            conversation.questions_asked(),
            "Questions Asked",
            "text-primary"
        ),
        pdfs = stat_card(
            "pdfs-loaded",
            conversation.pdfs_loaded(),
            "PDFs Loaded",
            "text-success"
        ),
    )
}
