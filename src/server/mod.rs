// src/server/mod.rs

//! TCP front end of the agent.
//!
//! - [`accept`] abstracts where connections come from.
//! - [`listener`] resolves and binds the loopback socket.
//! - [`connection`] runs the one-shot protocol on a single connection.
//! - [`shutdown`] carries the process-wide stop request.
//!
//! [`serve_connections`] is the accept loop: every accepted connection gets
//! its own Tokio task, and the loop never waits on a command.

pub mod accept;
pub mod connection;
pub mod listener;
pub mod shutdown;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::errors::Result;
use crate::exec::CommandRunner;

pub use accept::Acceptor;
pub use connection::{ConnectionOutcome, handle_connection};
pub use listener::bind_listener;
pub use shutdown::{ShutdownReason, ShutdownSignal, ShutdownTrigger, shutdown_channel};

/// Why [`AgentServer::serve`] returned.
#[derive(Debug)]
pub enum ServeOutcome {
    /// Shutdown was requested. In-flight workers are dropped with the server.
    Shutdown(ShutdownReason),
    /// `accept` failed. Workers that were running have finished.
    AcceptFailed(io::Error),
}

/// A bound agent ready to serve.
pub struct AgentServer {
    listener: TcpListener,
    runner: Arc<dyn CommandRunner>,
    trigger: ShutdownTrigger,
    signal: ShutdownSignal,
}

impl AgentServer {
    /// Bind the listener described by `config`.
    pub async fn bind(config: &ServerConfig, runner: Arc<dyn CommandRunner>) -> Result<Self> {
        let listener = bind_listener(config).await?;
        Ok(Self::from_listener(listener, runner))
    }

    /// Wrap an already bound listener.
    pub fn from_listener(listener: TcpListener, runner: Arc<dyn CommandRunner>) -> Self {
        let (trigger, signal) = shutdown_channel();
        Self {
            listener,
            runner,
            trigger,
            signal,
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle that stops the accept loop when fired.
    pub fn shutdown_trigger(&self) -> ShutdownTrigger {
        self.trigger.clone()
    }

    /// Accept connections until shutdown is requested or `accept` fails.
    pub async fn serve(self) -> ServeOutcome {
        let AgentServer {
            listener,
            runner,
            trigger,
            signal,
        } = self;
        serve_connections(listener, runner, trigger, signal).await
    }
}

/// The accept loop over any [`Acceptor`].
///
/// On an accept error the loop stops accepting and waits for running workers
/// before returning [`ServeOutcome::AcceptFailed`].
pub async fn serve_connections<A: Acceptor>(
    mut acceptor: A,
    runner: Arc<dyn CommandRunner>,
    trigger: ShutdownTrigger,
    mut signal: ShutdownSignal,
) -> ServeOutcome {
    let mut workers = JoinSet::new();

    loop {
        tokio::select! {
            biased;

            reason = signal.wait() => {
                info!(?reason, in_flight = workers.len(), "shutdown requested; no longer accepting");
                return ServeOutcome::Shutdown(reason);
            }

            accepted = acceptor.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!(%peer, "accepted connection");
                    let runner = Arc::clone(&runner);
                    let trigger = trigger.clone();
                    workers.spawn(run_worker(stream, peer, runner, trigger));
                }
                Err(err) => {
                    error!(error = %err, "accept error; no longer accepting");
                    return match drain_workers(&mut workers, &mut signal).await {
                        Some(reason) => ServeOutcome::Shutdown(reason),
                        None => ServeOutcome::AcceptFailed(err),
                    };
                }
            },

            Some(joined) = workers.join_next(), if !workers.is_empty() => {
                log_worker_exit(joined);
            }
        }
    }
}

/// Wait for running workers after the accept loop has stopped. A shutdown
/// request still cuts this short.
async fn drain_workers(
    workers: &mut JoinSet<()>,
    signal: &mut ShutdownSignal,
) -> Option<ShutdownReason> {
    if !workers.is_empty() {
        info!(in_flight = workers.len(), "waiting for running connections");
    }
    loop {
        tokio::select! {
            biased;

            reason = signal.wait() => return Some(reason),

            joined = workers.join_next() => match joined {
                Some(joined) => log_worker_exit(joined),
                None => return None,
            },
        }
    }
}

async fn run_worker<S>(
    stream: S,
    peer: SocketAddr,
    runner: Arc<dyn CommandRunner>,
    trigger: ShutdownTrigger,
) where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    match handle_connection(stream, runner.as_ref(), &trigger).await {
        Ok(outcome) => debug!(%peer, ?outcome, "connection closed"),
        Err(err) => {
            let message = format!("{err:#}");
            warn!(%peer, error = %message, "connection fault");
        }
    }
}

fn log_worker_exit(joined: std::result::Result<(), JoinError>) {
    if let Err(err) = joined {
        if err.is_panic() {
            error!(error = %err, "connection worker panicked");
        } else {
            debug!(error = %err, "connection worker cancelled");
        }
    }
}
