//! Tracing subscriber setup for the console binary

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when neither an explicit level nor `RUST_LOG` is given
pub const DEFAULT_LEVEL: &str = "warn";

/// Pick the filter: an explicit level wins, then `RUST_LOG`, then
/// [`DEFAULT_LEVEL`]
pub fn build_filter(log_level: Option<&str>) -> EnvFilter {
    match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL)),
    }
}

/// Install a stderr subscriber.
///
/// Does nothing when a global subscriber is already set, so tests and
/// embedding hosts can call it freely.
pub fn init_logger(log_level: Option<&str>) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(build_filter(log_level));

    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
}
