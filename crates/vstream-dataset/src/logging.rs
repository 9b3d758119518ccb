//! Tracing subscriber setup for binaries and notebooks driving the pipeline.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "vstream=info";

/// Whether `LOG_FORMAT` asks for JSON output.
pub fn json_requested() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install a global subscriber: JSON lines when `LOG_FORMAT=json`,
/// colored human-readable output otherwise.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    if json_requested() {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter())
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter())
            .try_init()
            .is_ok()
    }
}
