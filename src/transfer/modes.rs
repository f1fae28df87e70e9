//! FTP Transfer modes
//!
//! Each variant carries only the resources of its own mode.

use std::net::SocketAddr;

/// Data-channel negotiation state of a session.
#[derive(Debug)]
pub enum TransferMode<L> {
    None,
    /// PORT: the server connects to the client's address.
    Active(SocketAddr),
    /// PASV: the client connects to this listener.
    Passive(L),
}

impl<L> Default for TransferMode<L> {
    fn default() -> Self {
        TransferMode::None
    }
}

impl<L> TransferMode<L> {
    pub fn is_none(&self) -> bool {
        matches!(self, TransferMode::None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransferMode::None => "none",
            TransferMode::Active(_) => "active",
            TransferMode::Passive(_) => "passive",
        }
    }
}
