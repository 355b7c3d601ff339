//! Log output for the CLI

use anyhow::{Result, anyhow};
use tracing::{Level, info};

/// Structured logging configuration
#[derive(Debug, Clone, Copy)]
pub struct LoggingConfig {
    /// Level used when `RUST_LOG` is unset
    pub level: Level,
    /// One JSON object per event instead of text lines
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Level for a `-v` count: warn, info, debug, then trace.
    pub fn from_verbosity(verbose: u8, json_format: bool) -> Self {
        let level = match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self { level, json_format }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let fmt_layer = if config.json_format {
        fmt::layer().json().with_current_span(false).boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("logging already initialised: {e}"))?;

    info!(level = %config.level, json = config.json_format, "logging initialised");
    Ok(())
}
