use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::logging;
use crate::models::{ConfigSource, FairshareConfig};

/// Points at a TOML or JSON config file.
pub const CONFIG_PATH_ENV: &str = "FAIRSHARE_CONFIG_PATH";
/// Inline JSON config.
pub const CONFIG_JSON_ENV: &str = "FAIRSHARE_CONFIG_JSON";

const DEFAULT_CANDIDATES: &[&str] = &[
    "fairshare.toml",
    "fairshare.json",
    "config/fairshare.toml",
    "config/fairshare.json",
];

impl FairshareConfig {
    /// Load configuration using process environment variables, after
    /// honouring a `.env` file if one is present.
    ///
    /// Evaluation order:
    /// 1) `$FAIRSHARE_CONFIG_PATH` (TOML or JSON file),
    /// 2) `$FAIRSHARE_CONFIG_JSON` (inline JSON),
    /// 3) the first default file found in the working directory,
    /// 4) defaults.
    pub fn load_from_env() -> anyhow::Result<(Self, ConfigSource)> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::load_with(|key| env::var(key).ok(), Path::new("."))
    }

    /// Same as [`FairshareConfig::load_from_env`] with an injectable variable
    /// lookup and a base directory for the default file candidates.
    pub fn load_with<F>(lookup: F, base_dir: &Path) -> anyhow::Result<(Self, ConfigSource)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (config, source) = Self::resolve(&lookup, base_dir)?;
        config
            .validate()
            .with_context(|| format!("invalid fairshare config from {source:?}"))?;
        debug!(
            ?source,
            scoring = config.scheduler.scoring.as_str(),
            "loaded fairshare config"
        );
        Ok((config, source))
    }

    fn resolve<F>(lookup: &F, base_dir: &Path) -> anyhow::Result<(Self, ConfigSource)>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path_str) = lookup(CONFIG_PATH_ENV)
            && !path_str.trim().is_empty()
        {
            let path = PathBuf::from(path_str.trim());
            let config = Self::load_from_file(&path)
                .with_context(|| format!("failed to load {CONFIG_PATH_ENV}"))?;
            return Ok((config, ConfigSource::EnvPath(path)));
        }

        if let Some(raw) = lookup(CONFIG_JSON_ENV)
            && !raw.trim().is_empty()
        {
            let parsed = Self::parse_json(&raw, CONFIG_JSON_ENV)
                .with_context(|| format!("failed to parse {CONFIG_JSON_ENV}"))?;
            return Ok((parsed, ConfigSource::EnvInline));
        }

        if let Some(path) = Self::find_default_file(base_dir) {
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((Self::default(), ConfigSource::Default))
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let origin = path.display().to_string();

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents, &origin),
            Some("toml") | Some("tml") => {
                toml::from_str(&contents).map_err(|source| ConfigError::Toml { origin, source })
            }
            _ => Self::parse_from_str(&contents, &origin),
        }
    }

    /// Parse either TOML or JSON, trying TOML first.
    pub fn parse_from_str(contents: &str, origin: &str) -> Result<Self> {
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| ConfigError::Unparseable {
                origin: origin.to_string(),
                toml: toml_err.to_string(),
                json: json_err.to_string(),
            })
        })
    }

    pub fn parse_json(raw: &str, origin: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Json {
            origin: origin.to_string(),
            source,
        })
    }

    /// Reject settings that would only fail later, such as a malformed log
    /// filter.
    pub fn validate(&self) -> Result<()> {
        logging::build_filter(&self.logging.filter).map(|_| ())
    }

    fn find_default_file(base_dir: &Path) -> Option<PathBuf> {
        DEFAULT_CANDIDATES
            .iter()
            .map(|candidate| base_dir.join(candidate))
            .find(|path| path.exists())
    }
}
