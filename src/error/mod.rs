//! Error handling
//!
//! Defines error types and handling for the FTP server.

pub mod handlers;
pub mod types;

pub use handlers::{error_to_ftp_code, error_to_reply};
pub use types::*;
