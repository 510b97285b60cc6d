//! Process-wide `tracing` subscriber.
//!
//! Logs go to stderr so they never mix with command output on stdout.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install the subscriber with `directive` as the filter (e.g. "warn",
/// "notedeck=debug"). An unparsable directive falls back to "warn".
///
/// Returns `false` when a global subscriber was already installed.
pub fn init(directive: &str) -> bool {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()
        .is_ok()
}
