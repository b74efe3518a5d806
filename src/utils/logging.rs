//! Structured logging setup.
//!
//! Logs are written to stderr so that stdout only ever carries the echoed
//! message in client mode.

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{ChannelError, Result};

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over the configured level when set.
///
/// # Errors
/// Returns `ChannelError::ConfigError` if a global subscriber is already set
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| ChannelError::ConfigError(format!("Failed to install logger: {e}")))?;

    debug!(app = %config.app_name, "Logging initialized");
    Ok(())
}
