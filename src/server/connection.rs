// src/server/connection.rs

//! One-shot exchange on a single accepted connection.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::exec::CommandRunner;
use crate::protocol::{Request, Response, decode_line};
use crate::server::shutdown::{ShutdownReason, ShutdownTrigger};

/// Buffered response lines between a runner and the socket writer.
const RESPONSE_BUFFER: usize = 64;

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// EOF or an empty line; nothing was written.
    NoRequest,
    /// `AGENT_PING` answered.
    Pinged,
    /// A command was run (or failed to start) and reported.
    CommandReported,
    /// `AGENT_EXIT` answered and shutdown requested.
    ExitRequested,
}

/// Read one request line from `stream`, answer it, and return.
///
/// The stream and both of its halves are owned here, so they are released on
/// every return path, including errors.
pub async fn handle_connection<S>(
    stream: S,
    runner: &dyn CommandRunner,
    shutdown: &ShutdownTrigger,
) -> Result<ConnectionOutcome>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    let (read_half, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);

    let mut raw = Vec::new();
    let n = reader
        .read_until(b'\n', &mut raw)
        .await
        .context("reading request line")?;
    if n == 0 {
        return Ok(ConnectionOutcome::NoRequest);
    }

    let line = decode_line(&raw);
    let Some(request) = Request::parse(&line) else {
        return Ok(ConnectionOutcome::NoRequest);
    };

    match request {
        Request::Ping => {
            write_response(&mut writer, &Response::Pong).await?;
            Ok(ConnectionOutcome::Pinged)
        }
        Request::Exit => {
            info!("exit requested by client");
            let written = write_response(&mut writer, &Response::Bye).await;
            let closed = writer.shutdown().await;
            drop(writer);
            drop(reader);
            shutdown.trigger(ShutdownReason::ExitRequested);
            written?;
            closed.context("closing connection after BYE")?;
            Ok(ConnectionOutcome::ExitRequested)
        }
        Request::Command(command) => {
            run_command(command, runner, &mut writer).await?;
            writer.shutdown().await.context("closing connection")?;
            Ok(ConnectionOutcome::CommandReported)
        }
    }
}

/// Drive the runner and forward every line it produces, in order.
async fn run_command<W>(command: String, runner: &dyn CommandRunner, writer: &mut W) -> Result<()>
where
    W: AsyncWrite + Send + Unpin,
{
    let (tx, mut rx) = mpsc::channel::<Response>(RESPONSE_BUFFER);

    let run = runner.run(command, tx);
    let forward = async move {
        while let Some(response) = rx.recv().await {
            write_response(writer, &response).await?;
        }
        Ok::<(), anyhow::Error>(())
    };

    let ((), forwarded) = tokio::join!(run, forward);
    forwarded
}

async fn write_response<W>(writer: &mut W, response: &Response) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    debug!(line = %response, "sending response line");
    writer
        .write_all(response.to_line().as_bytes())
        .await
        .context("writing response line")?;
    writer.flush().await.context("flushing response line")?;
    Ok(())
}
