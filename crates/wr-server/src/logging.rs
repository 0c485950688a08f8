//! `tracing` subscriber setup shared by both binaries.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,tower_http=info";

/// Install a `fmt` subscriber filtered by `RUST_LOG` (falling back to
/// [`DEFAULT_FILTER`]).  Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
