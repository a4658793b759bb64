//! PDF upload handling.
//!
//! The [`UploadControl`] accepts candidate files from the file picker and from
//! drag-and-drop, keeps only PDFs, reports the selection upward, and runs a
//! simulated progress sequence that is independent of the real transfer. The
//! transfer itself goes to an [`UploadSink`] and its outcome is ignored.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use axum::body::Bytes;
//! use pdf_assistant::config::UploadConfig;
//! use pdf_assistant::scheduler::TaskScope;
//! use pdf_assistant::upload::{CandidateFile, DisabledSink, FileDescriptor, UploadControl};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let scope = TaskScope::new();
//! let control = UploadControl::new(
//!     UploadConfig::default(),
//!     Arc::new(DisabledSink),
//!     &scope,
//!     Arc::new(|file: &FileDescriptor| println!("selected {}", file.name())),
//! );
//!
//! let png = CandidateFile::new("image.png", Some("image/png"), Bytes::new());
//! assert!(!control.pick(png).is_accepted());
//! assert!(control.snapshot().selected_file().is_none());
//! # }
//! ```

mod control;
mod file;
mod sink;

pub use control::{
    FileSelectListener, IgnoreReason, PROGRESS_DONE, UploadControl, UploadOutcome, UploadState,
};
pub use file::{CandidateFile, FileDescriptor, PDF_MIME};
pub use sink::{
    DisabledSink, HttpUploadSink, SinkError, SinkOutcome, UPLOAD_PATH, UploadSink, fire_and_forget,
};
