use tracing_subscriber::EnvFilter;

use crate::{Error, Result};

/// Sends diagnostics to stderr, filtered by `RUST_LOG` (default `info`).
/// Progress lines from `info_time!` go to stdout and are not affected.
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| Error::Logging(err.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))
}
