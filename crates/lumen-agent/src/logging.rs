//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, else `default_directive`, else `info`.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global fmt subscriber.
///
/// Returns `false` if a subscriber was already installed; the existing one is
/// kept.
pub fn init_tracing(default_directive: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
