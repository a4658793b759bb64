use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging.
///
/// - `EnvFilter` reads `RUST_LOG`, defaulting to `info` with debug output for
///   this crate.
/// - `json` switches the `fmt` layer to one JSON object per line.
///
/// Calling this twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn init(json: bool) {
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pdf_assistant=debug"));

    let registry = tracing_subscriber::registry().with(filter_layer);

    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(false),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .compact(),
            )
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}
