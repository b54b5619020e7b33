use anyhow::{anyhow, Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

/// Subscriber writing timestamped, uncoloured records to `file`.
///
/// `RUST_LOG` overrides `default_level`.
pub fn file_subscriber(file: File, default_level: &str) -> impl Subscriber + Send + Sync {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .finish()
}

/// Install the global subscriber, appending to the log file at `path`.
pub fn init_file_logging(path: impl AsRef<Path>, default_level: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())
        .with_context(|| format!("failed to open log file: {}", path.as_ref().display()))?;
    tracing::subscriber::set_global_default(file_subscriber(file, default_level))
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}
