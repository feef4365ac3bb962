// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `CommandRunner` trait the connection worker
//!   talks to.
//! - [`shell`] holds `ShellRunner`, which spawns the command with
//!   `tokio::process::Command` and turns its output into protocol lines.

pub mod backend;
pub mod shell;

pub use backend::CommandRunner;
pub use shell::{ShellRunner, exit_code};
