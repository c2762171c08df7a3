//! Tracing setup for binaries, tests and benchmarks embedding the engine
//!
//! The library itself only emits `tracing` events; nothing is printed unless
//! a subscriber is installed.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "FILELIST_DB_LOG";

/// Install a formatted subscriber filtered by [`LOG_ENV`] (default `info`).
///
/// Returns `false` when a global subscriber was already installed, which
/// makes repeated calls harmless.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
