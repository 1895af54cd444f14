//! Logging setup for applications embedding fsmspec.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` formatter filtered by `RUST_LOG`
/// (defaults to `info`).
///
/// Does nothing if a global subscriber is already set.
pub fn init() {
    let _ = try_init();
}

/// Like [`init`], but reports whether a subscriber was already installed.
pub fn try_init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
}
