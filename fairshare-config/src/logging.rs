use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{ConfigError, Result};
use crate::models::LoggingConfig;

pub fn build_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|source| ConfigError::InvalidFilter {
        filter: directives.to_string(),
        source,
    })
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the configured
/// filter. Fails if a global subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.filter)?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_ansi(config.ansi))
        .try_init()?;
    Ok(())
}
