//! Error handlers
//!
//! Maps domain errors onto FTP replies at the command boundary.

use crate::error::types::{AuthError, FtpServerError, TransferError};
use crate::protocol::responses::{self, Reply};
use log::warn;

/// Handle an FTP server error
pub fn handle_error(err: &FtpServerError) {
    warn!("Command failed: {}", err);
}

/// Convert error to FTP response code
pub fn error_to_ftp_code(err: &FtpServerError) -> u16 {
    match err {
        FtpServerError::Auth(AuthError::MissingArgument) => responses::SYNTAX_ERROR,
        FtpServerError::Auth(AuthError::UsernameAlreadyProvided(_)) => responses::ACTION_NOT_TAKEN,
        FtpServerError::Auth(AuthError::NeedAccount) => responses::NEED_ACCOUNT,
        FtpServerError::Auth(_) => responses::AUTH_FAILED,
        FtpServerError::Storage(_) => responses::ACTION_NOT_TAKEN,
        FtpServerError::Navigate(_) => responses::ACTION_NOT_TAKEN,
        FtpServerError::Transfer(TransferError::InvalidPortCommand(_)) => responses::SYNTAX_ERROR,
        FtpServerError::Transfer(TransferError::IpMismatch { .. }) => responses::SYNTAX_ERROR,
        FtpServerError::Transfer(TransferError::TransferFailed(_)) => responses::ACTION_NOT_TAKEN,
        FtpServerError::Transfer(_) => responses::CANT_OPEN_DATA,
        FtpServerError::MissingArgument(_) => responses::SYNTAX_ERROR,
    }
}

/// Convert error to the reply sent on the control connection
pub fn error_to_reply(err: &FtpServerError) -> Reply {
    handle_error(err);
    if let FtpServerError::Auth(AuthError::NotLoggedIn) = err {
        return Reply::new(responses::AUTH_FAILED, "Please login with USER and PASS.");
    }
    match error_to_ftp_code(err) {
        responses::SYNTAX_ERROR => Reply::syntax_error(),
        responses::NEED_ACCOUNT => Reply::new(responses::NEED_ACCOUNT, "Need account for login."),
        responses::AUTH_FAILED => Reply::not_logged_in(),
        responses::CANT_OPEN_DATA => Reply::cant_open_data(),
        code => Reply::new(code, "Requested action not taken."),
    }
}
