//! Logging setup using `tracing` + `tracing-subscriber`
//!
//! Priority for the filter:
//! 1. `FEATPLAN_LOG` environment variable (any `EnvFilter` directive)
//! 2. `debug` when `--verbose` is set
//! 3. `warn`
//!
//! Logs go to stderr so stdout stays clean for `--format json`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "FEATPLAN_LOG";

/// Initialises the global subscriber. Call once at startup.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "featplan=debug"
    } else {
        "warn"
    }
}
