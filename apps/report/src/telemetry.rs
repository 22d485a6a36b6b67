//! # Logging Setup
//!
//! ## Filter Priority
//! - `RUST_LOG=debug` - Show debug messages
//! - `RUST_LOG=costbook_core=trace` - Show trace for the resolver only
//! - Otherwise the `[logging] filter` from the config (`COSTBOOK_LOG`)
//!
//! Logs go to stderr so that JSON on stdout can be piped.

use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(config_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
