//! Textual `:map`-family commands
//!
//! `nmap`, `nnoremap`, `nunmap` and their `i`/`c` counterparts, plus the bare
//! `map`/`noremap`/`unmap` forms which apply to normal mode.

use std::fmt;

use super::config::KeymapError;
use super::types::Mode;

/// Modes a map command can name
const COMMAND_MODES: [Mode; 3] = [Mode::NORMAL, Mode::INSERT, Mode::COMMAND];

/// A parsed map command, with lhs and rhs still in key notation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapCommand {
    Map {
        mode: Mode,
        lhs: String,
        rhs: String,
        remap: bool,
    },
    Unmap {
        mode: Mode,
        lhs: String,
    },
}

#[derive(Clone, Copy)]
enum Verb {
    Map,
    Noremap,
    Unmap,
}

impl MapCommand {
    /// Parse a command line such as `nnoremap gh :open<CR>` or `:imap jk=<Esc>`
    pub fn parse(line: &str) -> Result<MapCommand, KeymapError> {
        let line = line.trim();
        let line = line.strip_prefix(':').unwrap_or(line).trim_start();

        let (name, args) = match line.find(char::is_whitespace) {
            Some(idx) => (&line[..idx], line[idx..].trim()),
            None => (line, ""),
        };
        let (mode, verb) = parse_name(name)?;

        match verb {
            Verb::Unmap => {
                let lhs = args.split_whitespace().next().unwrap_or("");
                if lhs.is_empty() {
                    return Err(KeymapError::MissingLhs(line.to_string()));
                }
                Ok(MapCommand::Unmap {
                    mode,
                    lhs: lhs.to_string(),
                })
            }
            Verb::Map | Verb::Noremap => {
                let (lhs, rhs) = split_args(args);
                if lhs.is_empty() {
                    return Err(KeymapError::MissingLhs(line.to_string()));
                }
                let Some(rhs) = rhs.filter(|rhs| !rhs.is_empty()) else {
                    return Err(KeymapError::MissingRhs(line.to_string()));
                };
                Ok(MapCommand::Map {
                    mode,
                    lhs: lhs.to_string(),
                    rhs: rhs.to_string(),
                    remap: matches!(verb, Verb::Map),
                })
            }
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            MapCommand::Map { mode, .. } | MapCommand::Unmap { mode, .. } => *mode,
        }
    }

    pub fn lhs(&self) -> &str {
        match self {
            MapCommand::Map { lhs, .. } | MapCommand::Unmap { lhs, .. } => lhs,
        }
    }
}

fn parse_name(name: &str) -> Result<(Mode, Verb), KeymapError> {
    let verb_of = |rest: &str| match rest {
        "map" => Some(Verb::Map),
        "noremap" => Some(Verb::Noremap),
        "unmap" => Some(Verb::Unmap),
        _ => None,
    };

    if let Some(verb) = verb_of(name) {
        return Ok((Mode::NORMAL, verb));
    }

    let mut chars = name.chars();
    let mode = chars
        .next()
        .map(Mode)
        .filter(|mode| COMMAND_MODES.contains(mode));

    match (mode, verb_of(chars.as_str())) {
        (Some(mode), Some(verb)) => Ok((mode, verb)),
        _ => Err(KeymapError::UnknownCommand(name.to_string())),
    }
}

/// Split `lhs rhs` at the first whitespace, or `lhs=rhs` if there is none
fn split_args(args: &str) -> (&str, Option<&str>) {
    if let Some(idx) = args.find(char::is_whitespace) {
        return (&args[..idx], Some(args[idx..].trim()));
    }
    match args.split_once('=') {
        Some((lhs, rhs)) => (lhs, Some(rhs)),
        None => (args, None),
    }
}

impl fmt::Display for MapCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapCommand::Map {
                mode,
                lhs,
                rhs,
                remap,
            } => {
                let verb = if *remap { "map" } else { "noremap" };
                write!(f, "{}{} {} {}", mode, verb, lhs, rhs)
            }
            MapCommand::Unmap { mode, lhs } => write!(f, "{}unmap {}", mode, lhs),
        }
    }
}
