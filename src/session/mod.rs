//! Page session management.
//!
//! A page session is what one open browser tab sees: a transcript, an upload
//! control, and the timers driving both. Sessions live in memory only and are
//! identified by UUID.
//!
//! # Architecture
//!
//! - [`PageSession`]: one tab's conversation controller, upload control and timer scope
//! - [`SessionStore`]: thread-safe store for all live sessions, with idle expiry
//! - [`StreamGuard`]: keeps a session alive while its event stream is open
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pdf_assistant::config::AppConfig;
//! use pdf_assistant::session::SessionStore;
//! use pdf_assistant::upload::DisabledSink;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = AppConfig::default();
//! let store = SessionStore::new(config.chat, config.upload, Arc::new(DisabledSink));
//! let session = store.create(None).await;
//! session.conversation().submit_input("Hello!");
//!
//! assert_eq!(session.conversation().snapshot().len(), 2);
//! # }
//! ```

mod store;

pub use store::{PageSession, SessionStore, StreamGuard, viewer_offset_from_minutes};
