// src/client.rs

//! Client side of the agent protocol.
//!
//! Each call opens a fresh connection, sends one line and reads until the
//! agent closes the socket.

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::config::model::{DEFAULT_HOST, DEFAULT_PORT};
use crate::protocol::{
    BYE_REPLY, ERR_PREFIX, EXIT_CODE_PREFIX, EXIT_COMMAND, PING_COMMAND, PONG_REPLY, decode_line,
};

/// Output of one command, split back into its parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    /// `None` when the command could not be run (or the agent went away).
    pub exit_code: Option<i32>,
    /// Message of the single `ERR:` line sent instead of an exit code.
    pub failure: Option<String>,
}

impl CommandOutput {
    /// Rebuild the output from raw response lines.
    ///
    /// Only the last line is taken as `EXIT_CODE`. Without one, the last
    /// `ERR:` line is the failure message.
    pub fn from_lines(lines: Vec<String>) -> Self {
        let mut out = CommandOutput::default();
        let mut lines = lines;

        if let Some(code) = lines.last().and_then(|last| parse_exit_code(last)) {
            out.exit_code = Some(code);
            lines.pop();
        }

        for line in lines {
            match line.strip_prefix(ERR_PREFIX) {
                Some(rest) => out.stderr.push(rest.to_string()),
                None => out.stdout.push(line),
            }
        }

        if out.exit_code.is_none() {
            out.failure = out.stderr.pop();
        }
        out
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

fn parse_exit_code(line: &str) -> Option<i32> {
    line.strip_prefix(EXIT_CODE_PREFIX)?.trim().parse().ok()
}

/// Connects to a running agent.
#[derive(Debug, Clone)]
pub struct AgentClient {
    addr: String,
}

impl AgentClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Client for the agent on its default loopback address.
    pub fn local() -> Self {
        Self::new(format!("{DEFAULT_HOST}:{DEFAULT_PORT}"))
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// `true` if the agent answers `AGENT_PING` with `PONG`.
    pub async fn is_alive(&self) -> bool {
        match self.send_raw(PING_COMMAND).await {
            Ok(lines) => lines.iter().any(|line| line == PONG_REPLY),
            Err(err) => {
                warn!(addr = %self.addr, error = %err, "agent is not alive");
                false
            }
        }
    }

    /// Run `command` on the agent.
    pub async fn run_command(&self, command: &str) -> Result<CommandOutput> {
        let lines = self.send_raw(command).await?;
        Ok(CommandOutput::from_lines(lines))
    }

    /// Ask the agent to exit. `true` if it said `BYE`.
    pub async fn stop(&self) -> Result<bool> {
        let lines = self.send_raw(EXIT_COMMAND).await?;
        Ok(lines.iter().any(|line| line == BYE_REPLY))
    }

    /// Send one line and collect every response line until EOF.
    pub async fn send_raw(&self, line: &str) -> Result<Vec<String>> {
        if line.contains('\n') {
            bail!("request must be a single line");
        }
        debug!(addr = %self.addr, command = %line, "sending command to agent");

        let mut stream = TcpStream::connect(&self.addr)
            .await
            .with_context(|| format!("connecting to agent at {}", self.addr))?;

        stream
            .write_all(format!("{line}\n").as_bytes())
            .await
            .context("sending request line")?;
        stream.flush().await.context("flushing request line")?;

        let mut reader = BufReader::new(stream);
        let mut lines = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .await
                .context("reading agent response")?;
            if n == 0 {
                break;
            }
            lines.push(decode_line(&buf));
        }
        Ok(lines)
    }
}
