// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::ExecMode;

/// Loopback host the agent listens on unless configured otherwise.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Arbitrary high port shared by the agent and its client.
pub const DEFAULT_PORT: u16 = 52999;

/// Listen backlog handed to the OS.
pub const DEFAULT_BACKLOG: u32 = 50;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [server]
/// host = "127.0.0.1"
/// port = 52999
/// backlog = 50
///
/// [log]
/// path = "/tmp/agent_debug.log"
/// level = "debug"
///
/// [exec]
/// mode = "shell"
/// shell = "/bin/bash"
/// ```
///
/// All sections are optional and have reasonable defaults. This is the
/// unvalidated form; convert it with `ConfigFile::try_from`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub exec: ExecConfig,
}

/// A configuration that passed validation.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub exec: ExecConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(server: ServerConfig, log: LogConfig, exec: ExecConfig) -> Self {
        Self { server, log, exec }
    }

    /// Back to the raw form, e.g. to apply overrides and validate again.
    pub fn into_raw(self) -> RawConfigFile {
        RawConfigFile {
            server: self.server,
            log: self.log,
            exec: self.exec,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let raw = RawConfigFile::default();
        Self::new_unchecked(raw.server, raw.log, raw.exec)
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host name or IP to bind. Must resolve to a loopback address.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port. `0` asks the OS for an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Listen backlog.
    #[serde(default = "default_backlog")]
    pub backlog: u32,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_backlog() -> u32 {
    DEFAULT_BACKLOG
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            backlog: default_backlog(),
        }
    }
}

/// `[log]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Log file, truncated on every startup.
    #[serde(default = "default_log_path")]
    pub path: PathBuf,

    /// Level name ("error" .. "trace"). Overridden by `--log-level` and
    /// `SHELL_AGENT_LOG`.
    #[serde(default)]
    pub level: Option<String>,
}

/// Default log file location.
///
/// On Android the agent runs as the shell user, which can only write under
/// `/data/local/tmp`.
pub fn default_log_path() -> PathBuf {
    if cfg!(target_os = "android") {
        PathBuf::from("/data/local/tmp/agent_debug.log")
    } else {
        std::env::temp_dir().join("agent_debug.log")
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            level: None,
        }
    }
}

/// `[exec]` section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ExecConfig {
    #[serde(default)]
    pub mode: ExecMode,

    /// Interpreter override for `mode = "shell"`. Defaults to `sh` (`cmd` on
    /// Windows).
    #[serde(default)]
    pub shell: Option<String>,
}

impl ExecConfig {
    /// Interpreter program used in shell mode.
    pub fn effective_shell(&self) -> &str {
        match self.shell.as_deref() {
            Some(shell) => shell,
            None if cfg!(windows) => "cmd",
            None => "sh",
        }
    }
}
