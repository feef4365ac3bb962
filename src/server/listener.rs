// src/server/listener.rs

use std::io;
use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpSocket, lookup_host};

use crate::config::ServerConfig;
use crate::errors::{AgentError, Result};

/// Resolve the configured host and bind a TCP listener on it.
///
/// The first loopback address the host resolves to is used. A host that
/// only resolves to non-loopback addresses is refused: anything that can
/// reach this socket can run arbitrary commands.
pub async fn bind_listener(config: &ServerConfig) -> Result<TcpListener> {
    let addr = resolve_loopback(&config.host, config.port).await?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(|source| AgentError::Bind { addr, source })?;

    #[cfg(unix)]
    socket
        .set_reuseaddr(true)
        .map_err(|source| AgentError::Bind { addr, source })?;

    socket
        .bind(addr)
        .map_err(|source| AgentError::Bind { addr, source })?;
    socket
        .listen(config.backlog)
        .map_err(|source| AgentError::Bind { addr, source })
}

async fn resolve_loopback(host: &str, port: u16) -> Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|source| AgentError::Resolve {
            host: host.to_string(),
            port,
            source,
        })?
        .collect();

    if let Some(addr) = addrs.iter().find(|addr| addr.ip().is_loopback()) {
        return Ok(*addr);
    }

    match addrs.first() {
        Some(addr) => Err(AgentError::NotLoopback { addr: *addr }),
        None => Err(AgentError::Resolve {
            host: host.to_string(),
            port,
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses resolved"),
        }),
    }
}
