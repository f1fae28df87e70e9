//! Error types
//!
//! Defines domain-specific error types for each module of the FTP server.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Authentication module errors
#[derive(Debug, PartialEq)]
pub enum AuthError {
    MissingArgument,
    UsernameAlreadyProvided(String),
    AnonymousPassword,
    NeedAccount,
    NotLoggedIn,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingArgument => write!(f, "Missing USER/PASS argument"),
            AuthError::UsernameAlreadyProvided(u) => {
                write!(f, "Username already provided: {}", u)
            }
            AuthError::AnonymousPassword => write!(f, "Anonymous login takes no password"),
            AuthError::NeedAccount => write!(f, "Password received before username"),
            AuthError::NotLoggedIn => write!(f, "User not logged in"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    NotFound(PathBuf),
    AlreadyExists(PathBuf),
    NotADirectory(PathBuf),
    NoParent(PathBuf),
    IoError(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(p) => write!(f, "Not found: {}", p.display()),
            StorageError::AlreadyExists(p) => write!(f, "Already exists: {}", p.display()),
            StorageError::NotADirectory(p) => write!(f, "Not a directory: {}", p.display()),
            StorageError::NoParent(p) => write!(f, "No parent directory: {}", p.display()),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

/// Transfer module errors
#[derive(Debug)]
pub enum TransferError {
    DataChannelNotInitialized,
    ListenFailed(io::Error),
    AcceptFailed(io::Error),
    ConnectFailed(SocketAddr, io::Error),
    ConnectionTimeout,
    NoPassiveAddress,
    InvalidPortCommand(String),
    IpMismatch { expected: String, provided: String },
    UnexpectedPeer(SocketAddr),
    TransferFailed(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::DataChannelNotInitialized => write!(f, "Data channel not initialized"),
            TransferError::ListenFailed(e) => write!(f, "Failed to open passive listener: {}", e),
            TransferError::AcceptFailed(e) => {
                write!(f, "Failed to accept data connection: {}", e)
            }
            TransferError::ConnectFailed(addr, e) => {
                write!(f, "Failed to connect to {}: {}", addr, e)
            }
            TransferError::ConnectionTimeout => write!(f, "Timeout establishing data connection"),
            TransferError::NoPassiveAddress => {
                write!(f, "No IPv4 address available for passive mode")
            }
            TransferError::InvalidPortCommand(msg) => write!(f, "Invalid PORT command: {}", msg),
            TransferError::IpMismatch { expected, provided } => {
                write!(f, "IP mismatch: expected {}, got {}", expected, provided)
            }
            TransferError::UnexpectedPeer(peer) => {
                write!(f, "Rejected data connection from {}", peer)
            }
            TransferError::TransferFailed(e) => write!(f, "Transfer failed: {}", e),
        }
    }
}

impl std::error::Error for TransferError {}

/// Navigate module errors
#[derive(Debug)]
pub enum NavigateError {
    PathTraversal(String),
    DirectoryNotFound(PathBuf),
    AtRoot,
}

impl fmt::Display for NavigateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigateError::PathTraversal(p) => write!(f, "Path traversal attempt: {}", p),
            NavigateError::DirectoryNotFound(p) => {
                write!(f, "Directory not found: {}", p.display())
            }
            NavigateError::AtRoot => write!(f, "Already at the root directory"),
        }
    }
}

impl std::error::Error for NavigateError {}

/// General FTP server error that encompasses all error types
#[derive(Debug)]
pub enum FtpServerError {
    Auth(AuthError),
    Storage(StorageError),
    Transfer(TransferError),
    Navigate(NavigateError),
    MissingArgument(&'static str),
}

impl fmt::Display for FtpServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtpServerError::Auth(e) => write!(f, "Authentication error: {}", e),
            FtpServerError::Storage(e) => write!(f, "Storage error: {}", e),
            FtpServerError::Transfer(e) => write!(f, "Transfer error: {}", e),
            FtpServerError::Navigate(e) => write!(f, "Navigate error: {}", e),
            FtpServerError::MissingArgument(verb) => write!(f, "{} requires an argument", verb),
        }
    }
}

impl std::error::Error for FtpServerError {}

// Implement conversions from specific errors to FtpServerError
impl From<AuthError> for FtpServerError {
    fn from(error: AuthError) -> Self {
        FtpServerError::Auth(error)
    }
}

impl From<StorageError> for FtpServerError {
    fn from(error: StorageError) -> Self {
        FtpServerError::Storage(error)
    }
}

impl From<TransferError> for FtpServerError {
    fn from(error: TransferError) -> Self {
        FtpServerError::Transfer(error)
    }
}

impl From<NavigateError> for FtpServerError {
    fn from(error: NavigateError) -> Self {
        FtpServerError::Navigate(error)
    }
}
