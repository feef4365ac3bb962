// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::client::AgentClient;
use crate::config::ConfigOverrides;

/// Command-line arguments for `shell-agent`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "shell-agent",
    version,
    about = "Loopback TCP agent that runs one shell command per connection.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `shell-agent.toml` in the current working directory, if it
    /// exists; built-in defaults otherwise.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SHELL_AGENT_LOG`, the config file or `info` is used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// What to do. Defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the agent in the foreground.
    Serve(ServeArgs),
    /// Check whether an agent answers `AGENT_PING`.
    Ping(ClientArgs),
    /// Run a command through a running agent and print its output.
    Exec {
        #[command(flatten)]
        client: ClientArgs,

        /// Command line to send; joined with spaces.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Ask a running agent to exit.
    Stop(ClientArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    /// Host to bind (must be loopback).
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to bind.
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Log file, truncated at startup.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl ServeArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            log_file: self.log_file.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct ClientArgs {
    /// Agent address. Default: the agent's own default, `127.0.0.1:52999`.
    #[arg(long, value_name = "ADDR")]
    pub addr: Option<String>,
}

impl ClientArgs {
    pub fn client(&self) -> AgentClient {
        match &self.addr {
            Some(addr) => AgentClient::new(addr.clone()),
            None => AgentClient::local(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
