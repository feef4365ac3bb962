// src/exec/shell.rs

//! Child process runner used in production.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::ExecConfig;
use crate::exec::backend::CommandRunner;
use crate::protocol::{Response, decode_line};
use crate::types::ExecMode;

/// Runs each command line as a child process.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    config: ExecConfig,
}

impl ShellRunner {
    pub fn new(config: ExecConfig) -> Self {
        Self { config }
    }

    /// Build the child process for a command line according to the exec mode.
    pub fn build_command(&self, line: &str) -> Result<Command> {
        let cmd = match self.config.mode {
            ExecMode::Shell => {
                let shell = self.config.effective_shell();
                let mut c = Command::new(shell);
                if cfg!(windows) {
                    c.arg("/C").arg(line);
                } else {
                    c.arg("-c").arg(line);
                }
                c
            }
            ExecMode::Direct => {
                let mut tokens = line.split_whitespace();
                let Some(program) = tokens.next() else {
                    bail!("empty command");
                };
                let mut c = Command::new(program);
                c.args(tokens);
                c
            }
        };
        Ok(cmd)
    }

    /// Stream stdout, then buffered stderr, then return the exit code.
    async fn run_inner(&self, line: &str, out: &mpsc::Sender<Response>) -> Result<i32> {
        let mut cmd = self.build_command(line)?;
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("cannot run program '{line}'"))?;

        let stdout = child.stdout.take().context("child stdout was not captured")?;
        let stderr = child.stderr.take().context("child stderr was not captured")?;

        // Stderr is emitted only after stdout hits EOF, but it is read right
        // away so the child never blocks on a full pipe.
        let stderr_task = tokio::spawn(collect_lines(stderr));

        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .await
                .context("reading child stdout")?;
            if n == 0 {
                break;
            }
            forward(out, Response::Stdout(decode_line(&buf))).await;
        }

        let stderr_lines = stderr_task
            .await
            .context("stderr reader task failed")?
            .context("reading child stderr")?;
        for line in stderr_lines {
            forward(out, Response::Stderr(line)).await;
        }

        let status = child.wait().await.context("waiting for child process")?;
        Ok(exit_code(status))
    }
}

impl CommandRunner for ShellRunner {
    fn run(
        &self,
        command: String,
        out: mpsc::Sender<Response>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            info!(command = %command, mode = ?self.config.mode, "starting command process");

            match self.run_inner(&command, &out).await {
                Ok(code) => {
                    info!(command = %command, exit_code = code, "command process exited");
                    forward(&out, Response::ExitCode(code)).await;
                }
                Err(err) => {
                    let message = format!("{err:#}");
                    warn!(command = %command, error = %message, "command execution failed");
                    forward(&out, Response::failure(message)).await;
                }
            }
        })
    }
}

async fn forward(out: &mpsc::Sender<Response>, response: Response) {
    if out.send(response).await.is_err() {
        debug!("response receiver gone; discarding output line");
    }
}

async fn collect_lines<R>(stream: R) -> io::Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(lines);
        }
        lines.push(decode_line(&buf));
    }
}

/// Numeric exit code reported to the client.
///
/// A child killed by a signal reports `128 + signal` on Unix, like a shell
/// would. Anything else without a code reports `-1`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}
