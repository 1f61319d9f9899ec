//! Command-line argument parsing
//!
//! Supports:
//! - Feeding key bursts given as arguments
//! - Interactive mode reading bursts and commands from stdin
//! - Extra keymap files and `:map` commands
//! - JSON output

use clap::Parser;
use std::path::PathBuf;

use crate::keymap::{parse_mode, MapCommand, Mode};

/// Resolve vim-style key mappings
#[derive(Parser, Debug)]
#[command(name = "vimap", version, about = "Resolve vim-style key mappings")]
pub struct CliArgs {
    /// Key bursts in key notation, e.g. `gh` `<C-F>`; each argument is one burst
    #[arg(value_name = "KEYS")]
    pub keys: Vec<String>,

    /// Mode whose mappings apply (n, i, c, ...)
    #[arg(short, long, default_value = "n")]
    pub mode: String,

    /// Load extra mappings from a keymap YAML file
    #[arg(short, long, value_name = "FILE")]
    pub keymap: Vec<PathBuf>,

    /// Run a map command before feeding keys, e.g. `nnoremap gh :open<CR>`
    #[arg(long = "map", value_name = "CMD")]
    pub maps: Vec<String>,

    /// Start without the default and user keymaps
    #[arg(long)]
    pub no_defaults: bool,

    /// Print one JSON object per input instead of text
    #[arg(long)]
    pub json: bool,

    /// Read bursts from stdin, one per line
    #[arg(short, long)]
    pub interactive: bool,

    /// Ambiguity timeout in milliseconds, overriding the config file
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub mode: Mode,
    pub bursts: Vec<String>,
    pub keymap_files: Vec<PathBuf>,
    pub commands: Vec<MapCommand>,
    pub use_defaults: bool,
    pub json: bool,
    pub interactive: bool,
    pub timeout_ms: Option<u64>,
}

impl CliArgs {
    /// Convert parsed CLI args into startup configuration
    pub fn into_config(self) -> Result<StartupConfig, String> {
        let mode = parse_mode(&self.mode).map_err(|e| e.to_string())?;

        let commands = self
            .maps
            .iter()
            .map(|line| MapCommand::parse(line).map_err(|e| format!("--map {}: {}", line, e)))
            .collect::<Result<Vec<_>, _>>()?;

        if self.interactive && !self.keys.is_empty() {
            return Err("Key arguments cannot be combined with --interactive".to_string());
        }

        Ok(StartupConfig {
            mode,
            bursts: self.keys,
            keymap_files: self.keymap,
            commands,
            use_defaults: !self.no_defaults,
            json: self.json,
            interactive: self.interactive,
            timeout_ms: self.timeout,
        })
    }
}
