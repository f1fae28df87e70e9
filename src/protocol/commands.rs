//! Module `commands`
//!
//! Defines the control-line parser and the data structures used to represent
//! a received command and the outcome of executing it.

use std::path::MAIN_SEPARATOR_STR;

use crate::protocol::responses::Reply;

/// One control line split into verb and argument.
///
/// The verb is kept exactly as received; routing is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: String,
    pub argument: String,
}

/// Represents the outcome status of executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Struct encapsulating the full result of a command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub reply: Reply,
}

impl CommandResult {
    pub fn success(reply: Reply) -> Self {
        Self {
            status: CommandStatus::Success,
            reply,
        }
    }

    pub fn failure(reason: impl Into<String>, reply: Reply) -> Self {
        Self {
            status: CommandStatus::Failure(reason.into()),
            reply,
        }
    }

    pub fn close(reply: Reply) -> Self {
        Self {
            status: CommandStatus::CloseConnection,
            reply,
        }
    }
}

/// Parses a raw control line into a `Command`.
///
/// Trailing CR/LF are stripped, the line is split on the first space, and
/// every `/` in the argument becomes the local path separator. No verb
/// validation happens here.
pub fn parse_command(raw: &str) -> Command {
    let line = raw.trim_end_matches(['\r', '\n']);
    let (verb, argument) = line.split_once(' ').unwrap_or((line, ""));

    Command {
        verb: verb.to_string(),
        argument: argument.replace('/', MAIN_SEPARATOR_STR),
    }
}
