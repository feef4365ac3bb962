// src/exec/backend.rs

//! Pluggable command runner abstraction.
//!
//! A connection worker hands the received command line to a
//! `CommandRunner` together with the sending half of an mpsc channel. The
//! runner pushes `Response` lines in wire order; the worker forwards them to
//! the socket. Tests can swap in a runner that does not spawn processes.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::protocol::Response;

/// Trait abstracting how a command line is executed.
///
/// Implementations must finish with exactly one terminal response
/// (`ExitCode` or `Failure`). Send errors mean the client went away and
/// should not stop the runner from seeing the command through.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        command: String,
        out: mpsc::Sender<Response>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}
