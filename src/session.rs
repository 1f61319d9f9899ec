//! A mapping session for line-oriented hosts such as the CLI
//!
//! Couples a [`Mapper`] with a recording consumer in a switchable mode and
//! understands a small line protocol:
//!
//! - `keys`: a burst of typed keys in key notation
//! - empty line: let the ambiguity timer fire now
//! - `:nmap lhs rhs` and the rest of the map command family
//! - `:mode X`: switch to mode `X`, discarding pending keys
//! - `:normal[!] keys`: feed keys, `!` without mappings
//! - `:mappings`: list all mappings

use std::time::{Duration, Instant};

use serde_json::json;

use crate::config::EngineConfig;
use crate::keymap::{
    decode_for_display, display_key, parse_mode, Key, KeyRecorder, Keymap, KeymapError,
    MapCommand, Mapper, MatchState, Mode,
};

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Keys(String),
    Timeout,
    Map(MapCommand),
    Mode(Mode),
    Normal { keys: String, use_map: bool },
    List,
}

impl Input {
    pub fn parse(line: &str) -> Result<Input, KeymapError> {
        let line = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
        if line.is_empty() {
            return Ok(Input::Timeout);
        }
        let Some(command) = line.strip_prefix(':') else {
            return Ok(Input::Keys(line.to_string()));
        };

        let command = command.trim_start();
        let (name, args) = match command.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim_start()),
            None => (command, ""),
        };

        match name {
            "mode" => parse_mode(args.trim()).map(Input::Mode),
            "normal" => Ok(Input::Normal {
                keys: args.to_string(),
                use_map: true,
            }),
            "normal!" => Ok(Input::Normal {
                keys: args.to_string(),
                use_map: false,
            }),
            "mappings" => Ok(Input::List),
            _ => MapCommand::parse(command).map(Input::Map),
        }
    }
}

/// What one input did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub mode: Mode,
    pub state: MatchState,
    /// Keys handed to the mode during this input
    pub keys: Vec<Key>,
    /// Keys still waiting for more input
    pub pending: Vec<Key>,
    pub showcmd: String,
}

impl Report {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "mode": self.mode.to_string(),
            "state": format!("{:?}", self.state),
            "keys": self.keys.iter().map(|k| display_key(*k)).collect::<Vec<_>>(),
            "codes": self.keys.iter().map(|k| k.code()).collect::<Vec<_>>(),
            "pending": decode_for_display(&self.pending),
            "showcmd": self.showcmd,
        })
    }

    /// Single line summary, e.g. `n Done [b][a]`
    pub fn to_line(&self) -> String {
        let mut parts = vec![self.mode.to_string(), format!("{:?}", self.state)];
        if !self.keys.is_empty() {
            parts.push(decode_for_display(&self.keys));
        }
        if !self.pending.is_empty() {
            parts.push(format!("(pending {})", decode_for_display(&self.pending)));
        }
        parts.join(" ")
    }
}

pub struct Session {
    mapper: Mapper,
    recorder: KeyRecorder,
}

impl Session {
    pub fn new(keymap: Keymap, config: &EngineConfig, mode: Mode) -> Self {
        Self {
            mapper: Mapper::with_config(keymap, config),
            recorder: KeyRecorder::new(mode),
        }
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub fn mode(&self) -> Mode {
        self.recorder.mode
    }

    /// Switch modes; keys pending in the old mode are discarded
    pub fn set_mode(&mut self, mode: Mode) {
        if mode != self.recorder.mode {
            tracing::debug!("Mode {} -> {}", self.recorder.mode, mode);
            self.mapper.reset();
            self.recorder.mode = mode;
        }
    }

    pub fn execute(&mut self, command: &MapCommand) -> bool {
        self.mapper.execute(command)
    }

    /// Feed a burst of typed keys
    pub fn feed(&mut self, keys: &str, now: Instant) -> Report {
        let keys = crate::keymap::encode(keys);
        let state = self.mapper.handle_keys_at(&keys, now, &mut self.recorder);
        self.report(state)
    }

    /// Feed keys like `:normal`, optionally without mappings
    ///
    /// Normal mode is entered first, whatever mode was active.
    pub fn normal(&mut self, keys: &str, use_map: bool) -> Report {
        self.set_mode(Mode::NORMAL);
        let state = self.mapper.handle_string(keys, use_map, &mut self.recorder);
        self.report(state)
    }

    /// Resolve pending keys now
    pub fn timeout(&mut self) -> Report {
        let state = self.mapper.handle_timeout(&mut self.recorder);
        self.report(state)
    }

    /// Resolve pending keys if the ambiguity timer is due
    pub fn tick(&mut self, now: Instant) -> Option<Report> {
        let state = self.mapper.tick(now, &mut self.recorder)?;
        Some(self.report(state))
    }

    pub fn time_until_timeout(&self, now: Instant) -> Option<Duration> {
        self.mapper.time_until_timeout(now)
    }

    /// `mode* lhs rhs` lines for every mapping
    pub fn mapping_lines(&self) -> Vec<String> {
        self.mapper
            .keymap()
            .mappings()
            .iter()
            .map(|m| m.display_string())
            .collect()
    }

    /// Apply one parsed input line
    ///
    /// Returns a report for inputs that feed keys; map commands that fail
    /// (unmapping a missing lhs) are logged.
    pub fn apply(&mut self, input: Input, now: Instant) -> Option<Report> {
        match input {
            Input::Keys(keys) => Some(self.feed(&keys, now)),
            Input::Timeout => Some(self.timeout()),
            Input::Normal { keys, use_map } => Some(self.normal(&keys, use_map)),
            Input::Map(command) => {
                if !self.execute(&command) {
                    tracing::warn!("No such mapping: {}", command.lhs());
                }
                None
            }
            Input::Mode(mode) => {
                self.set_mode(mode);
                None
            }
            Input::List => None,
        }
    }

    fn report(&mut self, state: MatchState) -> Report {
        Report {
            mode: self.recorder.mode,
            state,
            keys: self.recorder.take(),
            pending: self.mapper.pending_keys(),
            showcmd: self.mapper.showcmd(),
        }
    }
}
