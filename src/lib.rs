// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use crate::cli::{CliArgs, ClientArgs, Command, ServeArgs};
use crate::config::resolve_config;
use crate::exec::ShellRunner;
use crate::logging::LogTarget;
use crate::server::{AgentServer, ServeOutcome, ShutdownReason};

/// What `main` should do once [`run`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// Return normally with this status.
    Code(u8),
    /// End the process now with status 0, without waiting for anything.
    Immediate,
}

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<RunExit> {
    match args.command.clone() {
        None => serve(&args, &ServeArgs::default()).await,
        Some(Command::Serve(serve_args)) => serve(&args, &serve_args).await,
        Some(Command::Ping(client)) => {
            logging::init_client_logging(args.log_level);
            ping(&client).await
        }
        Some(Command::Exec { client, command }) => {
            logging::init_client_logging(args.log_level);
            exec(&client, &command.join(" ")).await
        }
        Some(Command::Stop(client)) => {
            logging::init_client_logging(args.log_level);
            stop(&client).await
        }
    }
}

/// Run the agent: logging, bind, accept loop, Ctrl-C handling.
///
/// A bind failure is returned as an error before anything is accepted.
async fn serve(args: &CliArgs, serve_args: &ServeArgs) -> Result<RunExit> {
    let cfg = resolve_config(args.config.as_deref())?.with_overrides(serve_args.overrides())?;

    let target = logging::init_logging(args.log_level, &cfg.log);
    info!(version = env!("CARGO_PKG_VERSION"), pid = std::process::id(), "agent booting");
    if let LogTarget::File(path) = &target {
        info!(path = ?path, "logging to file");
    }

    let runner = Arc::new(ShellRunner::new(cfg.exec.clone()));
    let server = match AgentServer::bind(&cfg.server, runner).await {
        Ok(server) => server,
        Err(err) => {
            error!(error = %err, "fatal: cannot start listener");
            return Err(err.into());
        }
    };
    info!(addr = %server.local_addr()?, backlog = cfg.server.backlog, "listening");

    // Ctrl-C -> stop accepting and return.
    {
        let trigger = server.shutdown_trigger();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            trigger.trigger(ShutdownReason::Interrupted);
        });
    }

    match server.serve().await {
        ServeOutcome::Shutdown(ShutdownReason::ExitRequested) => {
            info!("exiting on client request");
            Ok(RunExit::Immediate)
        }
        ServeOutcome::Shutdown(ShutdownReason::Interrupted) => {
            info!("interrupted; exiting");
            Ok(RunExit::Code(0))
        }
        ServeOutcome::AcceptFailed(err) => {
            info!(error = %err, "accept loop ended; all connections finished");
            Ok(RunExit::Code(0))
        }
    }
}

async fn ping(args: &ClientArgs) -> Result<RunExit> {
    let client = args.client();
    if client.is_alive().await {
        println!("{}", protocol::PONG_REPLY);
        Ok(RunExit::Code(0))
    } else {
        eprintln!("no agent answering at {}", client.addr());
        Ok(RunExit::Code(1))
    }
}

/// Run a command remotely; the remote exit code becomes ours.
async fn exec(args: &ClientArgs, command: &str) -> Result<RunExit> {
    let client = args.client();
    let output = client.run_command(command).await?;

    for line in &output.stdout {
        println!("{line}");
    }
    for line in &output.stderr {
        eprintln!("{line}");
    }

    match (output.exit_code, output.failure.as_deref()) {
        (Some(code), _) => Ok(RunExit::Code(exit_status_byte(code))),
        (None, Some(message)) => {
            eprintln!("agent could not run command: {message}");
            Ok(RunExit::Code(1))
        }
        (None, None) => {
            eprintln!("agent closed the connection without an exit code");
            Ok(RunExit::Code(1))
        }
    }
}

async fn stop(args: &ClientArgs) -> Result<RunExit> {
    let client = args.client();
    if client.stop().await? {
        println!("{}", protocol::BYE_REPLY);
        Ok(RunExit::Code(0))
    } else {
        eprintln!("agent at {} did not acknowledge exit", client.addr());
        Ok(RunExit::Code(1))
    }
}

/// Clamp a remote exit code into a process status byte.
pub fn exit_status_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
