#![allow(dead_code)]

use std::path::PathBuf;

use shell_agent::config::{ConfigFile, ExecConfig, LogConfig, RawConfigFile, ServerConfig};
use shell_agent::types::ExecMode;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                server: ServerConfig::default(),
                log: LogConfig::default(),
                exec: ExecConfig::default(),
            },
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.config.server.host = host.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn backlog(mut self, backlog: u32) -> Self {
        self.config.server.backlog = backlog;
        self
    }

    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log.path = path.into();
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.log.level = Some(level.to_string());
        self
    }

    pub fn exec_mode(mut self, mode: ExecMode) -> Self {
        self.config.exec.mode = mode;
        self
    }

    pub fn shell(mut self, shell: &str) -> Self {
        self.config.exec.shell = Some(shell.to_string());
        self
    }

    /// The raw, unvalidated config.
    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
