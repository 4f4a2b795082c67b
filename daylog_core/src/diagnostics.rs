//! Diagnostics for daylog itself.
//!
//! These messages describe what the library is doing (directories created,
//! files opened) and go to stderr, never into a day log.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Stderr diagnostics at `warn`, or whatever `RUST_LOG` asks for
pub fn init() {
    init_with_level("warn")
}

/// Stderr diagnostics at `default_level` unless `RUST_LOG` is set.
///
/// A second call is ignored.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
