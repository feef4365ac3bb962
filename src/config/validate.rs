// src/config/validate.rs

use std::net::IpAddr;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{AgentError, Result};
use crate::logging::parse_level_str;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = AgentError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.server, raw.log, raw.exec))
    }
}

/// Run semantic validation against a deserialized configuration.
///
/// This checks:
/// - `[server].host` is non-empty, and is loopback when it is an IP literal
/// - `[server].backlog >= 1`
/// - `[log].level` names a known level
/// - `[exec].shell` is non-empty when given
///
/// Host names are resolved and checked for loopback at bind time.
pub fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_server(cfg)?;
    validate_log(cfg)?;
    validate_exec(cfg)?;
    Ok(())
}

fn validate_server(cfg: &RawConfigFile) -> Result<()> {
    let host = cfg.server.host.trim();
    if host.is_empty() {
        return Err(AgentError::Config(
            "[server].host must not be empty".to_string(),
        ));
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        if !ip.is_loopback() {
            return Err(AgentError::Config(format!(
                "[server].host must be a loopback address (got {ip})"
            )));
        }
    }

    if cfg.server.backlog == 0 {
        return Err(AgentError::Config(
            "[server].backlog must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_log(cfg: &RawConfigFile) -> Result<()> {
    if let Some(level) = cfg.log.level.as_deref() {
        if parse_level_str(level).is_none() {
            return Err(AgentError::Config(format!(
                "[log].level: unknown level '{level}'"
            )));
        }
    }

    if cfg.log.path.as_os_str().is_empty() {
        return Err(AgentError::Config(
            "[log].path must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_exec(cfg: &RawConfigFile) -> Result<()> {
    if let Some(shell) = cfg.exec.shell.as_deref() {
        if shell.trim().is_empty() {
            return Err(AgentError::Config(
                "[exec].shell must not be empty when set".to_string(),
            ));
        }
    }
    Ok(())
}
