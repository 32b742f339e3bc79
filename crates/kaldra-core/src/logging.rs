//! Structured logging setup for binaries embedding the kernels.
//!
//! Libraries only emit `tracing` events (targets under `kaldra::*`); the process
//! entry point calls [`init_logging`] once.

use crate::settings::BiasSettings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application name attached to pipeline spans.
pub const APP_NAME: &str = "kaldra-bias";

/// Filter directive used when `RUST_LOG` is unset: `settings.log_level` for `kaldra::*`
/// events, `warn` for everything else.
pub fn default_filter(settings: &BiasSettings) -> String {
    format!("warn,kaldra={}", settings.log_level.trim().to_lowercase())
}

/// Install the global subscriber (registry + env filter + fmt layer).
/// Returns false when a subscriber was already installed; that is not an error.
pub fn init_logging(settings: &BiasSettings) -> bool {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter(settings)));
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(
            target: "kaldra::logging",
            app = APP_NAME,
            env = %settings.environment,
            level = %settings.log_level,
            "Logging initialized"
        );
    }
    installed
}
