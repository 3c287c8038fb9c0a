use std::path::PathBuf;

use fairshare_core::SchedulerConfig;
use serde::{Deserialize, Serialize};

fn default_filter() -> String {
    "info".to_string()
}

/// Source that produced the loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

/// Top-level settings for an embedded fairshare scheduler.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FairshareConfig {
    /// Selection policy handed to [`fairshare_core::Scheduler`].
    pub scheduler: SchedulerConfig,
    /// Tracing output settings.
    pub logging: LoggingConfig,
}

/// Tracing subscriber settings. `RUST_LOG`, when set, takes precedence over
/// `filter`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string, e.g. `info,fairshare_core=debug`.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit ANSI colour codes.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            ansi: true,
        }
    }
}
