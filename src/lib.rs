//! PDF Assistant
//!
//! A two-panel web page for chatting about an uploaded PDF: the left panel
//! takes a document by drag-and-drop or file picker, the right panel holds a
//! conversation whose replies are simulated.
//!
//! # Architecture
//!
//! - **Server**: Axum routes, SSE fragment stream, static assets
//! - **Page sessions**: one conversation controller and one upload control per
//!   browser tab, with their timers bound to a cancellable scope
//! - **UI**: server-rendered HTML fragments swapped in by a small script
//!
//! # Modules
//!
//! - [`chat`]: transcript snapshots and the reply state machine
//! - [`upload`]: upload control, file descriptors and the external sink
//! - [`scheduler`]: scoped timers and snapshot state cells
//! - [`session`]: page session store
//! - [`ui`]: HTML rendering
//! - [`server`]: HTTP routes

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod ui;
pub mod upload;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::session::SessionStore;
use crate::upload::{DisabledSink, HttpUploadSink, SinkError, UploadSink};

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Global configuration.
    pub config: Arc<AppConfig>,
    /// Live page sessions.
    pub sessions: SessionStore,
}

impl AppState {
    /// Build state around an explicit upload sink.
    #[must_use]
    pub fn new(config: Arc<AppConfig>, sink: Arc<dyn UploadSink>) -> Self {
        let sessions = SessionStore::new(config.chat.clone(), config.upload.clone(), sink);
        Self { config, sessions }
    }

    /// Build state with the sink the configuration asks for.
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self, SinkError> {
        let upload = &config.upload;
        let sink: Arc<dyn UploadSink> = if upload.sink_enabled {
            Arc::new(HttpUploadSink::new(
                &upload.sink_url,
                upload.field_name.clone(),
                upload.sink_timeout(),
            )?)
        } else {
            Arc::new(DisabledSink)
        };
        Ok(Self::new(config, sink))
    }
}
