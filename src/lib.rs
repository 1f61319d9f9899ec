//! vimap - vim-style key-sequence mapping
//!
//! This crate resolves typed keys against user-defined, mode-scoped
//! mappings the way vim's `:map` family does, including prefix ambiguity
//! with a timeout and recursive remapping.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod keymap;
pub mod session;
pub mod tracing;

// Re-export commonly used types
pub use config::EngineConfig;
pub use keymap::{Key, KeyConsumer, KeyResult, Keymap, Mapper, MatchState, Mode};
pub use session::Session;
