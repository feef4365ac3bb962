// src/logging.rs

//! Logging setup for `shell-agent` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `SHELL_AGENT_LOG` environment variable (e.g. "info", "debug")
//! 3. `[log].level` from the config file
//! 4. default to `info`
//!
//! The agent writes its log to a file that is truncated on every start. If
//! the file cannot be opened, logging silently falls back to STDERR. Panics
//! are logged through the same subscriber.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::fmt;

use crate::cli::LogLevel;
use crate::config::LogConfig;

/// Environment variable consulted when no CLI level is given.
pub const LOG_ENV_VAR: &str = "SHELL_AGENT_LOG";

/// Where the global subscriber ended up writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// Initialise the global logging subscriber for the agent process.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, log: &LogConfig) -> LogTarget {
    let env_level = std::env::var(LOG_ENV_VAR).ok();
    let level = resolve_level(cli_level, env_level.as_deref(), log.level.as_deref());
    install_panic_hook();

    match open_log_file(&log.path) {
        Some(file) => {
            fmt()
                .with_max_level(level)
                .with_target(true)
                .with_ansi(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_writer(Arc::new(file))
                .init();
            LogTarget::File(log.path.clone())
        }
        None => {
            init_console_logging(level);
            LogTarget::Stderr
        }
    }
}

/// Initialise logging to STDERR only, for the client subcommands. These
/// must never touch the agent's log file.
pub fn init_client_logging(cli_level: Option<LogLevel>) {
    let env_level = std::env::var(LOG_ENV_VAR).ok();
    let level = match resolve_level(cli_level, env_level.as_deref(), None) {
        // Client output is the command output; keep chatter down by default.
        tracing::Level::INFO if cli_level.is_none() && env_level.is_none() => {
            tracing::Level::WARN
        }
        level => level,
    };
    init_console_logging(level);
}

fn init_console_logging(level: tracing::Level) {
    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Log every panic at error level, then run the previous hook.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let thread = std::thread::current();
        tracing::error!(
            thread = thread.name().unwrap_or("<unnamed>"),
            panic = %info,
            "uncaught panic"
        );
        previous(info);
    }));
}

/// Open (and truncate) the log file. `None` if that is not possible.
pub fn open_log_file(path: &Path) -> Option<File> {
    File::create(path).ok()
}

/// Pick the effective level from the CLI flag, environment and config.
/// Unparseable env or config values are skipped.
pub fn resolve_level(
    cli_level: Option<LogLevel>,
    env_level: Option<&str>,
    config_level: Option<&str>,
) -> tracing::Level {
    if let Some(lvl) = cli_level {
        return level_from_log_level(lvl);
    }
    env_level
        .and_then(parse_level_str)
        .or_else(|| config_level.and_then(parse_level_str))
        .unwrap_or(tracing::Level::INFO)
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

pub fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
