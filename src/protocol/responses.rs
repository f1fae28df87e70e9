//! FTP Response handling
//!
//! Defines FTP response codes and the control-channel reply codec.

use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Standard FTP response codes
pub const OK: u16 = 200;
pub const SYSTEM_TYPE: u16 = 215;
pub const READY: u16 = 220;
pub const CLOSING: u16 = 221;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const PASSIVE_MODE: u16 = 227;
pub const LOGIN_SUCCESS: u16 = 230;
pub const FILE_ACTION_OK: u16 = 250;
pub const PATHNAME_CREATED: u16 = 257;
pub const PASSWORD_REQUIRED: u16 = 331;
pub const NEED_ACCOUNT: u16 = 332;
pub const TOO_MANY_CONNECTIONS: u16 = 421;
pub const CANT_OPEN_DATA: u16 = 425;
pub const UNKNOWN_COMMAND: u16 = 500;
pub const SYNTAX_ERROR: u16 = 501;
pub const AUTH_FAILED: u16 = 530;
pub const ACTION_NOT_TAKEN: u16 = 550;

/// A single control-channel reply: a 3-digit code and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub message: String,
}

impl Reply {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn ok() -> Self {
        Self::new(OK, "Command okay.")
    }

    pub fn syntax_error() -> Self {
        Self::new(SYNTAX_ERROR, "Syntax error in parameters or arguments.")
    }

    pub fn not_logged_in() -> Self {
        Self::new(AUTH_FAILED, "Login incorrect.")
    }

    pub fn action_not_taken() -> Self {
        Self::new(ACTION_NOT_TAKEN, "Requested action not taken.")
    }

    pub fn cant_open_data() -> Self {
        Self::new(CANT_OPEN_DATA, "Can't open data connection.")
    }

    pub fn transfer_complete() -> Self {
        Self::new(TRANSFER_COMPLETE, "Transfer complete.")
    }

    /// Wire form of the reply, CRLF terminated.
    pub fn to_wire(&self) -> String {
        format_response(self.code, &self.message)
    }
}

/// Format an FTP response message.
///
/// Backslash separators in the message are rewritten to the forward slash
/// FTP clients expect. Nothing else is escaped.
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message.replace('\\', "/"))
}

/// Writes a reply to the control connection and flushes it.
///
/// A failure here is fatal to the session and is returned unchanged.
pub async fn send_reply<W>(writer: &mut W, reply: &Reply) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(reply.to_wire().as_bytes()).await?;
    writer.flush().await
}
