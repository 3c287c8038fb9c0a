//! Configuration loading for embedders of `fairshare-core`.
//!
//! Resolves a [`FairshareConfig`] from environment variables, config files,
//! or defaults, and installs the tracing subscriber described by its
//! logging section.

pub mod error;
pub mod loader;
pub mod logging;
pub mod models;

pub use error::ConfigError;
pub use loader::{CONFIG_JSON_ENV, CONFIG_PATH_ENV};
pub use logging::init_tracing;
pub use models::{ConfigSource, FairshareConfig, LoggingConfig};
