//! Module `state`
//!
//! Defines the `Session` struct holding the per-connection FTP state:
//! authentication progress, the confined working directory, the
//! negotiated data-channel mode and the address data connections must
//! belong to.

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use crate::auth::AuthState;
use crate::transfer::TransferMode;

/// State of one control connection.
///
/// `L` is the transport's passive listener type.
#[derive(Debug)]
pub struct Session<L> {
    auth: AuthState,
    base_dir: PathBuf,
    current_dir: PathBuf,
    transfer_mode: TransferMode<L>,
    passive_ip: Option<Ipv4Addr>,
    owner_ip: Option<IpAddr>,
}

impl<L> Session<L> {
    /// New session rooted at `base_dir`, starting there.
    ///
    /// `passive_ip` is the address advertised in PASV replies; without one
    /// PASV is refused.
    pub fn new(base_dir: PathBuf, passive_ip: Option<Ipv4Addr>) -> Self {
        Self {
            auth: AuthState::default(),
            current_dir: base_dir.clone(),
            base_dir,
            transfer_mode: TransferMode::None,
            passive_ip,
            owner_ip: None,
        }
    }

    /// Drops any negotiated data-channel mode, closing a pending listener.
    pub fn reset_transfer_mode(&mut self) {
        self.transfer_mode = TransferMode::None;
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn is_logged_in(&self) -> bool {
        self.auth.is_authenticated()
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn transfer_mode(&self) -> &TransferMode<L> {
        &self.transfer_mode
    }

    pub fn passive_ip(&self) -> Option<Ipv4Addr> {
        self.passive_ip
    }

    /// Address of the control client, when known. PORT targets and passive
    /// peers must match it.
    pub fn owner_ip(&self) -> Option<IpAddr> {
        self.owner_ip
    }

    // --------------------
    // Setter methods
    // --------------------

    pub fn auth_mut(&mut self) -> &mut AuthState {
        &mut self.auth
    }

    pub fn transfer_mode_mut(&mut self) -> &mut TransferMode<L> {
        &mut self.transfer_mode
    }

    pub fn set_owner_ip(&mut self, ip: Option<IpAddr>) {
        self.owner_ip = ip;
    }

    /// Sets the working directory. Callers pass paths already confined to
    /// the base directory.
    pub fn set_current_dir(&mut self, dir: PathBuf) {
        self.current_dir = dir;
    }
}
