//! Logging bootstrap shared by the agent and host integrations

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize console tracing for a process embedding the agent.
///
/// Honors `RUST_LOG` when set; falls back to `info` for everything and
/// `debug` for the agent's own targets so request/response logging from the
/// API client is visible during troubleshooting.
pub fn init_logging(process_name: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,agent=debug"));

    let result = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();

    match result {
        Ok(()) => tracing::debug!(process = process_name, "tracing initialized"),
        // A host may have installed its own subscriber already; that is fine.
        Err(_) => tracing::debug!(process = process_name, "tracing already initialized"),
    }
}
