//! # Input Line Grammar
//!
//! Everything typed into the input box goes through [`parse`]. Plain text is
//! a message for the active view; a leading `/` introduces a command.
//!
//! ```text
//! hello there                  → Send("hello there")
//! //etc/hosts                  → Send("/etc/hosts")
//! /peer 127.0.0.1:5001         → AddPeer
//! /search report,pdf 4         → Search { keywords: "report,pdf", budget: Some(4) }
//! /download a.txt 9f3c bob     → Download
//! ```

use std::fmt;
use std::path::PathBuf;

use crate::node::DownloadRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Text for the active view: broadcast in gossip, private in a peer tab.
    Send(String),
    AddPeer(String),
    RemovePeer(String),
    Rename(String),
    OpenTab(String),
    CloseTab,
    /// `budget: None` falls back to the configured default.
    Search {
        keywords: String,
        budget: Option<u32>,
    },
    Download(DownloadRequest),
    Upload(PathBuf),
    Refresh,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    InvalidBudget(String),
    UnknownCommand(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::MissingArgument { command, argument } => {
                write!(f, "/{command} needs a {argument}")
            }
            CommandError::InvalidBudget(raw) => {
                write!(f, "budget must be a non-negative number, got {raw:?}")
            }
            CommandError::UnknownCommand(name) => write!(f, "unknown command /{name}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// One-line help shown on `/help` and after an unknown command.
pub const HELP: &str = "/peer <addr> · /drop <addr> · /name <name> · /open <peer> · /close · \
    /search <keywords> [budget] · /download <name> <hash> [peer] · /upload <path> · /refresh · /quit";

pub fn parse(line: &str) -> Result<Input, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);

    let Some(body) = line.strip_prefix('/') else {
        return Ok(Input::Send(line.to_string()));
    };
    if body.starts_with('/') {
        return Ok(Input::Send(body.to_string()));
    }

    let (name, args) = match body.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (body, ""),
    };

    match name {
        "peer" => first_word(args, "peer", "address").map(Input::AddPeer),
        "drop" => first_word(args, "drop", "address").map(Input::RemovePeer),
        "name" => non_empty(args, "name", "name").map(Input::Rename),
        "open" => first_word(args, "open", "peer name").map(Input::OpenTab),
        "close" => Ok(Input::CloseTab),
        "search" => parse_search(args),
        "download" => parse_download(args),
        "upload" => non_empty(args, "upload", "file path").map(|p| Input::Upload(PathBuf::from(p))),
        "refresh" | "reconnect" => Ok(Input::Refresh),
        "help" => Ok(Input::Help),
        "quit" | "q" => Ok(Input::Quit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

fn first_word(
    args: &str,
    command: &'static str,
    argument: &'static str,
) -> Result<String, CommandError> {
    args.split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or(CommandError::MissingArgument { command, argument })
}

fn non_empty(
    args: &str,
    command: &'static str,
    argument: &'static str,
) -> Result<String, CommandError> {
    if args.is_empty() {
        Err(CommandError::MissingArgument { command, argument })
    } else {
        Ok(args.to_string())
    }
}

/// Keywords are one comma-separated word; anything after it is the budget.
fn parse_search(args: &str) -> Result<Input, CommandError> {
    let mut words = args.split_whitespace();
    let keywords = words.next().ok_or(CommandError::MissingArgument {
        command: "search",
        argument: "keyword list",
    })?;
    let budget = match (words.next(), words.next()) {
        (None, _) => None,
        (Some(raw), None) => Some(
            raw.parse::<u32>()
                .map_err(|_| CommandError::InvalidBudget(raw.to_string()))?,
        ),
        (Some(_), Some(_)) => {
            let rest = args[keywords.len()..].trim();
            return Err(CommandError::InvalidBudget(rest.to_string()));
        }
    };
    Ok(Input::Search {
        keywords: keywords.to_string(),
        budget,
    })
}

fn parse_download(args: &str) -> Result<Input, CommandError> {
    let mut words = args.split_whitespace();
    let name = words.next().ok_or(CommandError::MissingArgument {
        command: "download",
        argument: "file name",
    })?;
    let hash = words.next().ok_or(CommandError::MissingArgument {
        command: "download",
        argument: "hash",
    })?;
    let peer = words.next().unwrap_or_default();
    Ok(Input::Download(DownloadRequest {
        name: name.to_string(),
        hash: hash.to_string(),
        peer: peer.to_string(),
    }))
}
