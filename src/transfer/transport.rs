//! Transport collaborator
//!
//! Opens the per-transfer data connections: a listener for passive mode and
//! an outbound connection for active mode.

use log::debug;
use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};

/// Network operations needed to establish data connections.
pub trait Transport: Send + Sync {
    /// Passive-mode listener. Consumed by `accept`, so it serves one connection.
    type Listener: Send;
    /// An established data connection.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Starts listening on an ephemeral port.
    fn listen(&self) -> impl Future<Output = io::Result<(u16, Self::Listener)>> + Send;

    /// Waits for one inbound connection, then drops the listener. Returns the
    /// stream with the peer's address.
    fn accept(
        &self,
        listener: Self::Listener,
    ) -> impl Future<Output = io::Result<(Self::Stream, SocketAddr)>> + Send;

    /// Opens an outbound connection.
    fn connect(&self, addr: SocketAddr) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// TCP transport; passive listeners bind on `bind_ip`.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    bind_ip: IpAddr,
}

impl TcpTransport {
    pub fn new(bind_ip: IpAddr) -> Self {
        Self { bind_ip }
    }
}

impl Transport for TcpTransport {
    type Listener = TcpListener;
    type Stream = TcpStream;

    async fn listen(&self) -> io::Result<(u16, TcpListener)> {
        let listener = TcpListener::bind((self.bind_ip, 0)).await?;
        let port = listener.local_addr()?.port();
        debug!("Passive listener bound on {}:{}", self.bind_ip, port);
        Ok((port, listener))
    }

    async fn accept(&self, listener: TcpListener) -> io::Result<(TcpStream, SocketAddr)> {
        let (stream, peer) = listener.accept().await?;
        debug!("Accepted data connection from {}", peer);
        Ok((stream, peer))
    }

    async fn connect(&self, addr: SocketAddr) -> io::Result<TcpStream> {
        let stream = TcpStream::connect(addr).await?;
        debug!("Connected data connection to {}", addr);
        Ok(stream)
    }
}
