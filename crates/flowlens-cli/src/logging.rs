use tracing_subscriber::EnvFilter;

use crate::types::LogLevel;

/// Install the global subscriber. stdout belongs to the protocol, so
/// everything goes to stderr.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    // A second init (tests embedding `run`) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
