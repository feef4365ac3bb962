// src/types.rs

use std::str::FromStr;

use serde::Deserialize;

/// How a received command line is turned into a child process.
///
/// - `Shell`: hand the whole line to the platform command interpreter
///   (`sh -c` / `cmd /C`). This is the default.
/// - `Direct`: split the line on whitespace and spawn the first token with
///   the remaining tokens as arguments. No interpreter is involved, so an
///   unknown program is a spawn failure rather than a shell error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    #[default]
    Shell,
    Direct,
}

impl FromStr for ExecMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shell" => Ok(ExecMode::Shell),
            "direct" => Ok(ExecMode::Direct),
            other => Err(format!(
                "invalid exec mode: {other} (expected \"shell\" or \"direct\")"
            )),
        }
    }
}
