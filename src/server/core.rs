use log::{error, info, warn};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::client::{Session, handle_client};
use crate::protocol::responses::{self, Reply, send_reply};
use crate::server::config::ServerConfig;
use crate::storage::LocalFs;
use crate::transfer::TcpTransport;

/// State shared read-only by every session task.
struct Shared {
    config: ServerConfig,
    base_dir: PathBuf,
    passive_ip: Option<Ipv4Addr>,
    fs: LocalFs,
    transport: TcpTransport,
}

pub struct Server {
    listener: TcpListener,
    shared: Arc<Shared>,
    slots: Arc<Semaphore>,
}

fn invalid_config(e: ::config::ConfigError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
}

impl Server {
    /// Prepares the served directory and binds the control listener.
    pub async fn new(config: ServerConfig) -> io::Result<Self> {
        let bind_ip = config.bind_ip().map_err(invalid_config)?;
        let passive_ip = config.passive_ip().map_err(invalid_config)?;
        let control_socket = config.control_socket().map_err(invalid_config)?;

        let root = config.server_root_path();
        std::fs::create_dir_all(&root)?;
        let base_dir = root.canonicalize()?;
        info!("Server root directory: {}", base_dir.display());

        let listener = match TcpListener::bind(control_socket).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind to {}: {}", control_socket, e);
                return Err(e);
            }
        };
        info!("Server bound to {}", listener.local_addr()?);

        let slots = Arc::new(Semaphore::new(config.max_clients));
        Ok(Self {
            listener,
            shared: Arc::new(Shared {
                config,
                base_dir,
                passive_ip,
                fs: LocalFs,
                transport: TcpTransport::new(bind_ip),
            }),
            slots,
        })
    }

    /// Address the control listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts control connections forever, one task per session.
    pub async fn start(self) {
        info!(
            "Starting FTP server on {} (max {} clients)",
            self.shared.config.control_port, self.shared.config.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => match Arc::clone(&self.slots).try_acquire_owned() {
                    Ok(permit) => {
                        let shared = Arc::clone(&self.shared);

                        // Spawn a task for each client so accept loop doesn't block
                        tokio::spawn(async move {
                            if let Err(e) = handle_new_client(stream, addr, shared, permit).await {
                                warn!("Session with {} ended with error: {}", addr, e);
                            }
                        });
                    }
                    Err(_) => {
                        warn!("Rejecting {}: too many connections", addr);
                        tokio::spawn(reject_client(stream));
                    }
                },
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Runs one session; the permit frees its slot when the session ends.
async fn handle_new_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    shared: Arc<Shared>,
    _permit: OwnedSemaphorePermit,
) -> io::Result<()> {
    info!("Accepted control connection from {}", client_addr);

    let passive_ip = shared.passive_ip.or_else(|| advertised_ip(&stream));
    let mut session = Session::new(shared.base_dir.clone(), passive_ip);
    session.set_owner_ip(Some(client_addr.ip()));

    handle_client(
        stream,
        session,
        &shared.fs,
        &shared.transport,
        &shared.config,
        client_addr,
    )
    .await
}

/// The control connection's local IPv4 address, used for PASV replies.
fn advertised_ip(stream: &TcpStream) -> Option<Ipv4Addr> {
    match stream.local_addr().ok()?.ip() {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(ip) => ip.to_ipv4_mapped(),
    }
}

async fn reject_client(mut stream: TcpStream) {
    let reply = Reply::new(
        responses::TOO_MANY_CONNECTIONS,
        "Too many connections. Try again later.",
    );
    if send_reply(&mut stream, &reply).await.is_ok() {
        let _ = stream.shutdown().await;
    }
}
