//! Logging bootstrap.

use tracing_subscriber::EnvFilter;

/// Build the filter used by [`init`].
///
/// `RUST_LOG` wins when set and parseable; otherwise `fallback` is used, and
/// if that does not parse either, `info`.
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global fmt subscriber. Calling it twice is harmless; the second
/// call is ignored.
pub fn init(log_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level))
        .try_init();
}
