//! Command handlers module for the FTP server.
//!
//! Routes a parsed command to its handler behind the login gate, and turns
//! every handler outcome into exactly one reply.

use log::{debug, info};
use std::path::PathBuf;

use crate::client::Session;
use crate::error::{AuthError, FtpServerError, NavigateError, TransferError, error_to_reply};
use crate::navigate::{change_directory, change_to_parent, print_working_directory, resolve_path};
use crate::protocol::responses::{self, Reply};
use crate::protocol::{Command, CommandResult};
use crate::server::config::ServerConfig;
use crate::storage::FileSystem;
use crate::storage::operations::{delete_file, make_directory, remove_directory};
use crate::transfer::{
    Transport, close_data_stream, encode_pasv_address, open_data_connection, receive_file,
    send_file, send_listing, setup_active_mode, setup_passive_mode,
};

/// Dispatches a received FTP command to its corresponding handler.
///
/// USER and PASS are always accepted; every other verb requires a logged-in
/// session and is otherwise answered with 530 without side effects.
pub async fn handle_command<F, T>(
    session: &mut Session<T::Listener>,
    command: &Command,
    fs: &F,
    transport: &T,
    config: &ServerConfig,
) -> CommandResult
where
    F: FileSystem,
    T: Transport,
{
    let arg = command.argument.as_str();

    match command.verb.as_str() {
        "USER" => return handle_cmd_user(session, arg),
        "PASS" => return handle_cmd_pass(session, arg),
        _ => {}
    }

    if !session.is_logged_in() {
        debug!("Rejected {} before login", command.verb);
        return fail(AuthError::NotLoggedIn.into());
    }

    match command.verb.as_str() {
        "SYST" => CommandResult::success(Reply::new(responses::SYSTEM_TYPE, "UNIX Type: L8")),
        "HELP" => CommandResult::success(Reply::new(responses::OK, "Help done.")),
        "NOOP" | "TYPE" => CommandResult::success(Reply::ok()),
        "PWD" => handle_cmd_pwd(session),
        "CWD" => handle_cmd_cwd(session, fs, arg),
        "CDUP" => handle_cmd_cdup(session, fs),
        "MKD" => handle_cmd_mkd(session, fs, arg),
        "RMD" => handle_cmd_rmd(session, fs, arg),
        "DELE" => handle_cmd_dele(session, fs, arg),
        "PASV" => handle_cmd_pasv(session, transport).await,
        "PORT" => handle_cmd_port(session, arg),
        "LIST" => handle_cmd_list(session, fs, transport, config, arg).await,
        "RETR" => handle_cmd_retr(session, fs, transport, config, arg).await,
        "STOR" => handle_cmd_stor(session, fs, transport, config, arg).await,
        "QUIT" => handle_cmd_quit(session),
        _ => CommandResult::failure(
            format!("Unknown command {}", command.verb),
            Reply::new(responses::UNKNOWN_COMMAND, "Unknown command."),
        ),
    }
}

fn fail(err: FtpServerError) -> CommandResult {
    let reply = error_to_reply(&err);
    CommandResult::failure(err.to_string(), reply)
}

fn require_argument<'a>(verb: &'static str, arg: &'a str) -> Result<&'a str, FtpServerError> {
    if arg.is_empty() {
        Err(FtpServerError::MissingArgument(verb))
    } else {
        Ok(arg)
    }
}

/// Resolves a required path argument against the session directories.
fn resolve_target<L>(
    session: &Session<L>,
    verb: &'static str,
    arg: &str,
) -> Result<PathBuf, FtpServerError> {
    let arg = require_argument(verb, arg)?;
    Ok(resolve_path(session.base_dir(), session.current_dir(), arg)?)
}

/// Handles the USER command
fn handle_cmd_user<L>(session: &mut Session<L>, username: &str) -> CommandResult {
    match session.auth_mut().process_user(username) {
        Ok(result) if result.logged_in => {
            info!("User {} logged in", result.username);
            CommandResult::success(Reply::new(
                responses::LOGIN_SUCCESS,
                "User logged in, proceed.",
            ))
        }
        Ok(_) => CommandResult::success(Reply::new(
            responses::PASSWORD_REQUIRED,
            "User name okay, need password.",
        )),
        Err(e) => fail(e.into()),
    }
}

/// Handles the PASS command
fn handle_cmd_pass<L>(session: &mut Session<L>, password: &str) -> CommandResult {
    match session.auth_mut().process_pass(password) {
        Ok(result) => {
            info!("User {} logged in", result.username);
            CommandResult::success(Reply::new(
                responses::LOGIN_SUCCESS,
                "User logged in, proceed.",
            ))
        }
        Err(e) => fail(e.into()),
    }
}

fn handle_cmd_pwd<L>(session: &Session<L>) -> CommandResult {
    let pwd = print_working_directory(session.base_dir(), session.current_dir());
    CommandResult::success(Reply::new(
        responses::PATHNAME_CREATED,
        format!("\"{}\" is current directory.", pwd),
    ))
}

fn handle_cmd_cwd<L, F: FileSystem>(session: &mut Session<L>, fs: &F, arg: &str) -> CommandResult {
    let result = require_argument("CWD", arg).and_then(|arg| {
        change_directory(fs, session.base_dir(), session.current_dir(), arg)
            .map_err(FtpServerError::from)
    });

    match result {
        Ok(dir) => {
            session.set_current_dir(dir);
            CommandResult::success(Reply::new(
                responses::FILE_ACTION_OK,
                "Requested file action okay.",
            ))
        }
        Err(e) => fail(e),
    }
}

fn handle_cmd_cdup<L, F: FileSystem>(session: &mut Session<L>, fs: &F) -> CommandResult {
    match change_to_parent(fs, session.base_dir(), session.current_dir()) {
        Ok(dir) => {
            session.set_current_dir(dir);
            CommandResult::success(Reply::new(
                responses::FILE_ACTION_OK,
                "Requested file action okay.",
            ))
        }
        Err(e) => fail(e),
    }
}

fn handle_cmd_mkd<L, F: FileSystem>(session: &Session<L>, fs: &F, arg: &str) -> CommandResult {
    let result = resolve_target(session, "MKD", arg)
        .and_then(|target| Ok(make_directory(fs, &target)?));

    match result {
        Ok(()) => CommandResult::success(Reply::ok()),
        Err(e) => fail(e),
    }
}

/// Handles RMD. The base directory itself cannot be removed; removing an
/// ancestor of the working directory moves the session back to the base.
fn handle_cmd_rmd<L, F: FileSystem>(session: &mut Session<L>, fs: &F, arg: &str) -> CommandResult {
    let result = resolve_target(session, "RMD", arg).and_then(|target| {
        if target == session.base_dir() {
            return Err(NavigateError::AtRoot.into());
        }
        remove_directory(fs, &target)?;
        Ok(target)
    });

    match result {
        Ok(target) => {
            if session.current_dir().starts_with(&target) {
                let base = session.base_dir().to_path_buf();
                session.set_current_dir(base);
            }
            CommandResult::success(Reply::ok())
        }
        Err(e) => fail(e),
    }
}

fn handle_cmd_dele<L, F: FileSystem>(session: &Session<L>, fs: &F, arg: &str) -> CommandResult {
    let result = resolve_target(session, "DELE", arg)
        .and_then(|target| Ok(delete_file(fs, &target)?));

    match result {
        Ok(()) => CommandResult::success(Reply::new(
            responses::FILE_ACTION_OK,
            "Requested file action okay, completed.",
        )),
        Err(e) => fail(e),
    }
}

/// Handles the PASV command: the listener is bound before the reply goes out.
async fn handle_cmd_pasv<T: Transport>(
    session: &mut Session<T::Listener>,
    transport: &T,
) -> CommandResult {
    let passive_ip = session.passive_ip();

    match setup_passive_mode(transport, session.transfer_mode_mut(), passive_ip).await {
        Ok(addr) => CommandResult::success(Reply::new(
            responses::PASSIVE_MODE,
            format!(
                "Entering Passive Mode ({}).",
                encode_pasv_address(*addr.ip(), addr.port())
            ),
        )),
        Err(e) => fail(e.into()),
    }
}

fn handle_cmd_port<L>(session: &mut Session<L>, arg: &str) -> CommandResult {
    let owner_ip = session.owner_ip();
    let result = require_argument("PORT", arg)
        .and_then(|arg| Ok(setup_active_mode(session.transfer_mode_mut(), arg, owner_ip)?));

    match result {
        Ok(_) => CommandResult::success(Reply::new(responses::OK, "Entering Active Mode.")),
        Err(e) => fail(e),
    }
}

/// Handles LIST; an empty argument lists the working directory.
async fn handle_cmd_list<F, T>(
    session: &mut Session<T::Listener>,
    fs: &F,
    transport: &T,
    config: &ServerConfig,
    arg: &str,
) -> CommandResult
where
    F: FileSystem,
    T: Transport,
{
    let mut stream = match open_session_data(session, transport, config).await {
        Ok(stream) => stream,
        Err(e) => return fail(e.into()),
    };

    let target = if arg.is_empty() {
        Ok(session.current_dir().to_path_buf())
    } else {
        resolve_path(session.base_dir(), session.current_dir(), arg).map_err(FtpServerError::from)
    };

    let outcome = match target {
        Ok(target) => send_listing(fs, &mut stream, &target).await.map(|_| ()),
        Err(e) => Err(e),
    };

    close_data_stream(&mut stream).await;
    finish_transfer(outcome)
}

async fn handle_cmd_retr<F, T>(
    session: &mut Session<T::Listener>,
    fs: &F,
    transport: &T,
    config: &ServerConfig,
    arg: &str,
) -> CommandResult
where
    F: FileSystem,
    T: Transport,
{
    if let Err(e) = require_argument("RETR", arg) {
        return fail(e);
    }

    let mut stream = match open_session_data(session, transport, config).await {
        Ok(stream) => stream,
        Err(e) => return fail(e.into()),
    };

    let outcome = match resolve_target(session, "RETR", arg) {
        Ok(target) => send_file(fs, &mut stream, &target).await.map(|_| ()),
        Err(e) => Err(e),
    };

    close_data_stream(&mut stream).await;
    finish_transfer(outcome)
}

async fn handle_cmd_stor<F, T>(
    session: &mut Session<T::Listener>,
    fs: &F,
    transport: &T,
    config: &ServerConfig,
    arg: &str,
) -> CommandResult
where
    F: FileSystem,
    T: Transport,
{
    if let Err(e) = require_argument("STOR", arg) {
        return fail(e);
    }

    let mut stream = match open_session_data(session, transport, config).await {
        Ok(stream) => stream,
        Err(e) => return fail(e.into()),
    };

    let outcome = match resolve_target(session, "STOR", arg) {
        Ok(target) => receive_file(fs, &mut stream, &target, config.buffer_size)
            .await
            .map(|_| ()),
        Err(e) => Err(e),
    };

    close_data_stream(&mut stream).await;
    finish_transfer(outcome)
}

/// Opens the negotiated data connection, held to the control client's address.
async fn open_session_data<T: Transport>(
    session: &mut Session<T::Listener>,
    transport: &T,
    config: &ServerConfig,
) -> Result<T::Stream, TransferError> {
    let owner_ip = session.owner_ip();
    open_data_connection(
        transport,
        session.transfer_mode_mut(),
        config.data_timeout(),
        owner_ip,
    )
    .await
}

/// Single terminal reply of a transfer whose data connection was opened.
fn finish_transfer(outcome: Result<(), FtpServerError>) -> CommandResult {
    match outcome {
        Ok(()) => CommandResult::success(Reply::transfer_complete()),
        Err(e) => fail(e),
    }
}

/// Handles the QUIT command: drops any pending data channel and signals
/// connection close.
fn handle_cmd_quit<L>(session: &mut Session<L>) -> CommandResult {
    session.reset_transfer_mode();
    CommandResult::close(Reply::new(
        responses::CLOSING,
        "Service closing control connection.",
    ))
}
