// src/server/shutdown.rs

//! Process-wide shutdown signal.
//!
//! Any worker (or the Ctrl-C listener) may fire the trigger; the accept loop
//! waits on the signal and returns, and `main` decides how to exit. Only the
//! first reason is kept.

use std::sync::Arc;

use tokio::sync::watch;

/// Why the agent is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// A client sent `AGENT_EXIT`.
    ExitRequested,
    /// Ctrl-C / SIGINT.
    Interrupted,
}

/// Cloneable handle used to request shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl ShutdownTrigger {
    /// Request shutdown. Returns `false` if a shutdown was already requested.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(reason);
                true
            } else {
                false
            }
        })
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        *self.tx.borrow()
    }
}

/// Receiving side, owned by the accept loop.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: watch::Receiver<Option<ShutdownReason>>,
}

impl ShutdownSignal {
    /// Resolve once shutdown has been requested.
    pub async fn wait(&mut self) -> ShutdownReason {
        loop {
            if let Some(reason) = *self.rx.borrow_and_update() {
                return reason;
            }
            if self.rx.changed().await.is_err() {
                // Every trigger is gone, so nothing can ever fire.
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Create a connected trigger/signal pair.
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(None);
    (ShutdownTrigger { tx: Arc::new(tx) }, ShutdownSignal { rx })
}
