//! Diagnostic tracing for workflow resolution.
//!
//! Output goes to stderr and is controlled by `RUST_LOG`; stdout is reserved
//! for command output (summaries, target lists).

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
///
/// # Example
/// ```bash
/// RUST_LOG=ecophylo=debug ecophylo -c config.json --list-targets
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
