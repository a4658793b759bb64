//! PDF Assistant server
//!
//! Entry point: load configuration, initialize logging, serve.

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use mimalloc::MiMalloc;

use pdf_assistant::config::AppConfig;
use pdf_assistant::{server, telemetry};

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize tracing (M-LOG-STRUCTURED)
    telemetry::init(config.logging.json);

    server::start_server(Arc::new(config)).await
}
