// src/protocol/response.rs

use std::fmt;

use super::{BYE_REPLY, ERR_PREFIX, EXIT_CODE_PREFIX, PONG_REPLY};

/// One line the agent writes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Pong,
    Bye,
    /// A child stdout line, verbatim.
    Stdout(String),
    /// A child stderr line, sent as `ERR: <line>`.
    Stderr(String),
    /// Final `EXIT_CODE: <n>` line.
    ExitCode(i32),
    /// Spawn or read failure, sent as `ERR: <message>` with no exit code.
    Failure(String),
}

impl Response {
    /// Failure from any displayable error. Line breaks are flattened so the
    /// message stays a single protocol line.
    pub fn failure(err: impl fmt::Display) -> Self {
        let message = err.to_string().replace(['\r', '\n'], " ");
        Response::Failure(message)
    }

    /// Wire form, newline terminated.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }

    /// Whether this line completes a command response.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Response::Pong | Response::Bye | Response::ExitCode(_) | Response::Failure(_)
        )
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Pong => f.write_str(PONG_REPLY),
            Response::Bye => f.write_str(BYE_REPLY),
            Response::Stdout(line) => f.write_str(line),
            Response::Stderr(line) | Response::Failure(line) => {
                write!(f, "{ERR_PREFIX}{line}")
            }
            Response::ExitCode(code) => write!(f, "{EXIT_CODE_PREFIX}{code}"),
        }
    }
}
