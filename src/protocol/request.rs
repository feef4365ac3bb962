// src/protocol/request.rs

use super::{EXIT_COMMAND, PING_COMMAND};

/// The single line a client sends, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `AGENT_PING`: liveness check.
    Ping,
    /// `AGENT_EXIT`: stop the whole agent.
    Exit,
    /// Anything else: run it.
    Command(String),
}

impl Request {
    /// Classify a request line (line ending already removed).
    ///
    /// Control words must match exactly; `" AGENT_PING"` is a command.
    /// Returns `None` for an empty line, which gets no response.
    pub fn parse(line: &str) -> Option<Request> {
        match line {
            "" => None,
            PING_COMMAND => Some(Request::Ping),
            EXIT_COMMAND => Some(Request::Exit),
            other => Some(Request::Command(other.to_string())),
        }
    }

    pub fn is_control(&self) -> bool {
        !matches!(self, Request::Command(_))
    }
}

/// Decode raw bytes read up to (and including) the first `\n`.
///
/// Strips one trailing `\n` and then one trailing `\r`. Invalid UTF-8 is
/// replaced rather than rejected.
pub fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
