// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// a checked `ConfigFile`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration to use at startup.
///
/// - An explicit path must exist and be valid.
/// - Without one, [`default_config_path`] is used if it exists.
/// - Otherwise built-in defaults apply.
pub fn resolve_config(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let fallback = default_config_path();
    if fallback.is_file() {
        debug!(path = ?fallback, "loading default config file");
        return load_and_validate(&fallback);
    }

    Ok(ConfigFile::default())
}

/// Default config path: `shell-agent.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("shell-agent.toml")
}

/// Overrides coming from the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFile {
    /// Apply CLI overrides and validate the result again.
    pub fn with_overrides(self, overrides: ConfigOverrides) -> Result<ConfigFile> {
        let mut raw = self.into_raw();
        if let Some(host) = overrides.host {
            raw.server.host = host;
        }
        if let Some(port) = overrides.port {
            raw.server.port = port;
        }
        if let Some(path) = overrides.log_file {
            raw.log.path = path;
        }
        ConfigFile::try_from(raw)
    }
}
