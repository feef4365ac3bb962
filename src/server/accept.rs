// src/server/accept.rs

//! Source of incoming connections for the accept loop.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};

/// Anything the accept loop can pull connections from.
///
/// `accept` must be cancel-safe: the loop races it against shutdown and
/// worker completion.
pub trait Acceptor: Send {
    type Stream: AsyncRead + AsyncWrite + Send + Unpin + 'static;

    fn accept(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = io::Result<(Self::Stream, SocketAddr)>> + Send + '_>>;
}

impl Acceptor for TcpListener {
    type Stream = TcpStream;

    fn accept(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = io::Result<(Self::Stream, SocketAddr)>> + Send + '_>> {
        Box::pin(TcpListener::accept(self))
    }
}
