//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Builds the filter from `RUST_LOG`, falling back to `default_directive`.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Initialize tracing for the process, optionally as JSON lines.
///
/// `log` records are forwarded to the subscriber. Safe to call multiple times
/// (subsequent calls are no-ops); returns whether this call installed it.
pub fn init_tracing(json: bool) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_target(true);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    result.is_ok()
}
