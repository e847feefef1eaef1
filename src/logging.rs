//! Log output setup for the CLI
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job. Filter precedence: `RUST_LOG`, then the caller's filter
//! (normally `[logging] filter` from the config file), then `info`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter for `init_logging`.
pub fn build_filter(filter: Option<&str>) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }

    match filter {
        Some(f) if !f.trim().is_empty() => {
            EnvFilter::try_new(f).unwrap_or_else(|_| EnvFilter::new("info"))
        }
        _ => EnvFilter::new("info"),
    }
}

/// Install the global subscriber: human-readable lines on stderr with the
/// module target, no thread ids, colors unless `NO_COLOR` is set.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_logging(filter: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(std::env::var("NO_COLOR").is_err()),
        )
        .with(build_filter(filter))
        .try_init();
}
