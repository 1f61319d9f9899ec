//! Vim-style key mapping engine
//!
//! This module provides the mapping layer between raw key input and a modal
//! application's key handlers:
//! - Encodes key notation (`<C-F>`, `<Tab>`, `<Up>`) into engine keys
//! - Stores user mappings per mode (`:nmap`, `:inoremap`, ...)
//! - Resolves typed keys incrementally, waiting on ambiguous prefixes
//! - Expands mappings recursively (remap) or literally (noremap)
//! - Loads mappings from YAML keymap files
//!
//! # Architecture
//!
//! ```text
//! Keystroke → keys_from_keystroke() → Mapper::handle_keys() → KeyConsumer::handle_key()
//!                                        ↑ Keymap::find_matches()
//! ```
//!
//! # Example
//!
//! ```
//! use vimap::keymap::{KeyRecorder, Keymap, Mapper, MatchState, Mode};
//!
//! let mut keymap = Keymap::new();
//! keymap.insert(Mode::NORMAL, "gh", ":open<CR>", false);
//!
//! let mut mapper = Mapper::new(keymap);
//! let mut recorder = KeyRecorder::new(Mode::NORMAL);
//!
//! assert_eq!(mapper.handle_string("g", true, &mut recorder), MatchState::Ambiguous);
//! assert_eq!(mapper.handle_string("h", true, &mut recorder), MatchState::Done);
//! assert_eq!(recorder.display(), ":open^M");
//! ```

mod binding;
mod command;
mod config;
mod defaults;
#[allow(clippy::module_inception)]
mod keymap;
mod keypress;
mod notation;
mod resolver;
mod timer;
mod types;

pub use binding::KeyMapping;
pub use command::MapCommand;
pub use config::{load_keymap_file, parse_keymap_yaml, parse_mode, KeymapError, MappingEntry};
pub use defaults::{
    default_mappings, get_default_keymap_yaml, load_default_keymap, merge_keymap_file,
    merge_mappings,
};
pub use keymap::{Keymap, MatchResult};
pub use keypress::keys_from_keystroke;
pub use notation::{
    ctrl_byte, decode_bytes, decode_for_display, display_key, encode, encode_bytes,
};
pub use resolver::{KeyConsumer, KeyRecorder, KeyResult, Mapper, MatchState};
pub use timer::{AmbiguityTimer, DEFAULT_TIMEOUT_MS};
pub use types::{Key, KeyCode, Keystroke, Mode, Modifiers, SpecialKey, CSI};
