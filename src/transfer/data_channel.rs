//! Module `data_channel`
//!
//! PASV/PORT negotiation and the "establish data connection" step shared by
//! LIST, RETR and STOR.

use log::{debug, error, info, warn};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use crate::error::TransferError;
use crate::transfer::modes::TransferMode;
use crate::transfer::transport::Transport;

/// Parses a PORT argument `h1,h2,h3,h4,p1,p2` into the client's data address.
pub fn parse_port_argument(argument: &str) -> Result<SocketAddrV4, TransferError> {
    let parts: Vec<&str> = argument.split(',').map(str::trim).collect();
    if parts.len() != 6 {
        return Err(TransferError::InvalidPortCommand(format!(
            "expected 6 fields, got {}",
            parts.len()
        )));
    }

    let mut octets = [0u8; 6];
    for (octet, part) in octets.iter_mut().zip(&parts) {
        *octet = part
            .parse::<u8>()
            .map_err(|_| TransferError::InvalidPortCommand(format!("bad field '{}'", part)))?;
    }

    let ip = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
    let port = u16::from(octets[4]) * 256 + u16::from(octets[5]);
    Ok(SocketAddrV4::new(ip, port))
}

/// Encodes an address as the `h1,h2,h3,h4,p1,p2` PASV payload.
pub fn encode_pasv_address(ip: Ipv4Addr, port: u16) -> String {
    let [h1, h2, h3, h4] = ip.octets();
    format!("{},{},{},{},{},{}", h1, h2, h3, h4, port / 256, port % 256)
}

/// Sets up passive mode: discards any previous mode, then starts listening
/// immediately so the client's connect cannot race the next command.
pub async fn setup_passive_mode<T: Transport>(
    transport: &T,
    mode: &mut TransferMode<T::Listener>,
    advertised_ip: Option<Ipv4Addr>,
) -> Result<SocketAddrV4, TransferError> {
    if !mode.is_none() {
        debug!("Discarding previous {} mode before PASV", mode.name());
    }
    *mode = TransferMode::None;

    let ip = advertised_ip.ok_or(TransferError::NoPassiveAddress)?;
    let (port, listener) = transport
        .listen()
        .await
        .map_err(TransferError::ListenFailed)?;

    *mode = TransferMode::Passive(listener);
    info!("Entered passive mode on {}:{}", ip, port);
    Ok(SocketAddrV4::new(ip, port))
}

/// Sets up active mode from a PORT argument. A malformed argument, or a
/// target other than `owner_ip`, leaves the current mode untouched. No
/// connection is opened yet.
pub fn setup_active_mode<L>(
    mode: &mut TransferMode<L>,
    argument: &str,
    owner_ip: Option<IpAddr>,
) -> Result<SocketAddrV4, TransferError> {
    let addr = parse_port_argument(argument)?;
    if let Some(owner) = owner_ip {
        let provided = IpAddr::V4(*addr.ip());
        if owner.to_canonical() != provided {
            return Err(TransferError::IpMismatch {
                expected: owner.to_string(),
                provided: provided.to_string(),
            });
        }
    }
    *mode = TransferMode::Active(SocketAddr::V4(addr));
    info!("Entered active mode targeting {}", addr);
    Ok(addr)
}

/// Establishes the data connection for one transfer.
///
/// The negotiated mode is consumed: a passive listener serves exactly one
/// connection and is dropped afterwards, and a PORT target is used once.
/// With an `owner_ip`, a passive connection from any other address is
/// refused.
pub async fn open_data_connection<T: Transport>(
    transport: &T,
    mode: &mut TransferMode<T::Listener>,
    timeout: Duration,
    owner_ip: Option<IpAddr>,
) -> Result<T::Stream, TransferError> {
    let result = match std::mem::take(mode) {
        TransferMode::None => return Err(TransferError::DataChannelNotInitialized),
        TransferMode::Active(addr) => {
            debug!("Connecting to client data port {}", addr);
            match tokio::time::timeout(timeout, transport.connect(addr)).await {
                Ok(stream) => stream.map_err(|e| TransferError::ConnectFailed(addr, e)),
                Err(_) => Err(TransferError::ConnectionTimeout),
            }
        }
        TransferMode::Passive(listener) => {
            debug!("Waiting for client to connect to passive listener");
            match tokio::time::timeout(timeout, transport.accept(listener)).await {
                Ok(Ok((stream, peer))) => check_owner(stream, peer, owner_ip),
                Ok(Err(e)) => Err(TransferError::AcceptFailed(e)),
                Err(_) => Err(TransferError::ConnectionTimeout),
            }
        }
    };

    if let Err(e) = &result {
        error!("Failed to establish data connection: {}", e);
    }
    result
}

fn check_owner<S>(
    stream: S,
    peer: SocketAddr,
    owner_ip: Option<IpAddr>,
) -> Result<S, TransferError> {
    match owner_ip {
        Some(owner) if owner.to_canonical() != peer.ip().to_canonical() => {
            warn!("Rejected data connection from {}, expected {}", peer, owner);
            Err(TransferError::UnexpectedPeer(peer))
        }
        _ => Ok(stream),
    }
}
