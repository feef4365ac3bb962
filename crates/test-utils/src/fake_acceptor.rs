use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;

use shell_agent::server::Acceptor;
use tokio::io::DuplexStream;
use tokio::sync::mpsc;

/// What a [`ChannelAcceptor`] hands out next.
pub type Accepted = io::Result<(DuplexStream, SocketAddr)>;

/// An acceptor fed by the test through an mpsc channel.
///
/// Each `Ok` becomes an accepted in-memory connection, each `Err` an accept
/// failure. Once every sender is gone, `accept` never resolves.
pub struct ChannelAcceptor {
    rx: mpsc::Receiver<Accepted>,
}

impl ChannelAcceptor {
    pub fn channel() -> (mpsc::Sender<Accepted>, Self) {
        let (tx, rx) = mpsc::channel(8);
        (tx, Self { rx })
    }
}

impl Acceptor for ChannelAcceptor {
    type Stream = DuplexStream;

    fn accept(&mut self) -> Pin<Box<dyn Future<Output = Accepted> + Send + '_>> {
        Box::pin(async move {
            match self.rx.recv().await {
                Some(next) => next,
                None => std::future::pending().await,
            }
        })
    }
}

/// A connected client/agent pair of in-memory streams.
pub fn connection_pair() -> (DuplexStream, DuplexStream) {
    tokio::io::duplex(4096)
}

/// Placeholder peer address for in-memory connections.
pub fn fake_peer(n: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 40000 + n))
}
