//! Logging for sorting runs
//!
//! - `RunLog` is the explicit, per-run event log written to a file
//! - `init_tracing` sets up the console subscriber that mirrors it

mod run_log;

pub use run_log::{LogEvent, LogRecord, RunLog, Severity};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "rule_sorter=info";

/// Install the global console subscriber.
///
/// Respects `RUST_LOG`; writes to stderr. Call once from `main`.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
