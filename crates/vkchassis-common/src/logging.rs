use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "VKCHASSIS_LOG";

static INIT: Once = Once::new();

/// Initialize structured logging with environment filter.
/// Set VKCHASSIS_LOG=debug (or trace, info, warn, error) for verbosity control;
/// `default_filter` applies when it is unset.
///
/// The layer lives inside someone else's process, so an already installed
/// global subscriber wins and this becomes a no-op.
pub fn init_logging(default_filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        let _ = fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
