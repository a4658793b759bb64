//! Chat panel rendering.

mod header;
mod input_area;
mod message;
mod message_list;
mod shell;

pub use header::{
    DOCUMENT_ID, NO_DOCUMENT_LABEL, render_auth_widget, render_document_label, render_header,
};
pub use input_area::render_input_area;
pub use message::{format_timestamp, render_message};
pub use message_list::{TRANSCRIPT_ID, render_transcript};
pub use shell::render_chat_panel;
