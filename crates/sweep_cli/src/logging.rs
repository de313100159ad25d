//! Diagnostics for the `sweep` binary.
//!
//! Library crates only emit `tracing` events; this is the one place a
//! subscriber is installed. Job results go to stdout as JSON and are never
//! affected by `RUST_LOG`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a compact stderr subscriber filtered by `RUST_LOG`.
///
/// Defaults to `warn` when `RUST_LOG` is unset, or `info` with `verbose`.
///
/// ```bash
/// RUST_LOG=sweep_core=debug sweep run --program echo a=1,2
/// ```
pub fn init(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
