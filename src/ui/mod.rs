//! Server-rendered HTML.
//!
//! Every view is a plain function from a snapshot to an HTML string. The page
//! is rendered once on load; afterwards the server pushes [`Fragment`]s over
//! SSE and the client swaps each one in by element id.
//!
//! # Structure
//!
//! - [`page`]: HTML shell and the two-panel layout
//! - [`chat`]: header, transcript, message renderer, input area
//! - [`upload`]: drop zone and file status card
//! - [`stats`]: "Questions Asked" / "PDFs Loaded" cards
//! - [`components`]: buttons, cards, badges, icons

pub mod chat;
pub mod components;
pub mod page;
pub mod stats;
pub mod upload;

use chrono::FixedOffset;

use crate::chat::Conversation;
use crate::upload::UploadState;

pub use page::{PageView, html_shell, render_page};

/// A piece of the page that is re-rendered when its snapshot changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    Transcript,
    Upload,
    Stats,
    Document,
}

impl Fragment {
    /// SSE event name carrying this fragment.
    #[must_use]
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Transcript => "transcript",
            Self::Upload => "upload",
            Self::Stats => "stats",
            Self::Document => "document",
        }
    }

    /// Id of the element the fragment replaces.
    #[must_use]
    pub fn target_id(self) -> &'static str {
        match self {
            Self::Transcript => chat::TRANSCRIPT_ID,
            Self::Upload => upload::UPLOAD_ID,
            Self::Stats => stats::STATS_ID,
            Self::Document => chat::DOCUMENT_ID,
        }
    }
}

/// Fragments derived from a conversation snapshot.
#[must_use]
pub fn conversation_fragments(
    conversation: &Conversation,
    offset: &FixedOffset,
) -> [(Fragment, String); 3] {
    [
        (
            Fragment::Transcript,
            chat::render_transcript(conversation, offset),
        ),
        (Fragment::Stats, stats::render_stats(conversation)),
        (
            Fragment::Document,
            chat::render_document_label(conversation.loaded_document()),
        ),
    ]
}

/// Fragment derived from an upload snapshot.
#[must_use]
pub fn upload_fragment(state: &UploadState, max_file_size: usize) -> (Fragment, String) {
    (
        Fragment::Upload,
        upload::render_upload_panel(state, max_file_size),
    )
}
