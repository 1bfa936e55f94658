//! Diagnostic logging.
//!
//! Events go to stderr so they never mix with the tree on stdout. The
//! filter comes from `ARBOR_LOG` (standard `EnvFilter` directives) and
//! defaults to warnings only.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "ARBOR_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// The filter from `ARBOR_LOG`, or warnings when unset or invalid.
pub fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(build_env_filter())
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}
