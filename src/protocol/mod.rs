// src/protocol/mod.rs

//! Line protocol spoken over an agent connection.
//!
//! A client sends exactly one newline-terminated line and reads until the
//! agent closes the connection:
//!
//! - `AGENT_PING` → `PONG`
//! - `AGENT_EXIT` → `BYE`, then the agent exits
//! - anything else → stdout lines, `ERR: `-prefixed stderr lines, then
//!   `EXIT_CODE: <n>`; or a single `ERR: <message>` if the command could
//!   not be run.

pub mod request;
pub mod response;

pub use request::{Request, decode_line};
pub use response::Response;

pub const PING_COMMAND: &str = "AGENT_PING";
pub const EXIT_COMMAND: &str = "AGENT_EXIT";
pub const PONG_REPLY: &str = "PONG";
pub const BYE_REPLY: &str = "BYE";
pub const ERR_PREFIX: &str = "ERR: ";
pub const EXIT_CODE_PREFIX: &str = "EXIT_CODE: ";
