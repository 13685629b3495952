//! Logging setup and Prometheus metrics.

pub mod metrics;

pub use metrics::Metrics;

use tracing::Level;
use tracing_subscriber::prelude::*;

/// Install the global subscriber: `RUST_LOG` filtering on top of a default
/// level, compact stdout output. Safe to call more than once.
pub fn init_tracing(default_level: Level) {
    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()))
        .with(stdout_layer)
        .try_init();
}
