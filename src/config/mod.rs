// src/config/mod.rs

//! Configuration loading and validation for shell-agent.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate listener, logging and exec settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{ConfigOverrides, load_and_validate, load_from_path, resolve_config};
pub use model::{ConfigFile, ExecConfig, LogConfig, RawConfigFile, ServerConfig};
pub use validate::validate_raw_config;
