//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use vimap::keymap::{decode_for_display, Key, KeyConsumer, KeyResult, Keymap, Mapper, Mode};

/// Mode used by mappings that should not collide with the defaults
pub const TEST_MODE: Mode = Mode('t');

/// The mapping table used throughout the resolution tests
pub fn test_keymap() -> Keymap {
    let mut keymap = Keymap::new();
    for (lhs, rhs) in [
        ("a", "[a]"),
        ("b", "[b]"),
        ("<Tab>", "[tab]"),
        ("<S-Tab>", "[shift-tab]"),
        ("<C-F>", "[ctrl-f]"),
        ("<CR>", "[cr]"),
        ("foobar", "[baz]"),
    ] {
        keymap.insert(TEST_MODE, lhs, rhs, false);
    }
    keymap
}

/// A mode handler that records keys and can be told to await more input
pub struct Recorder {
    pub mode: Mode,
    pub keys: Vec<Key>,
    /// Keys answered with AwaitMore
    pub prefixes: Vec<u8>,
}

impl Recorder {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            keys: Vec::new(),
            prefixes: Vec::new(),
        }
    }

    pub fn with_prefixes(mode: Mode, prefixes: &[u8]) -> Self {
        Self {
            prefixes: prefixes.to_vec(),
            ..Self::new(mode)
        }
    }

    /// Recorded keys as display text, clearing the record
    pub fn drain(&mut self) -> String {
        let text = decode_for_display(&self.keys);
        self.keys.clear();
        text
    }
}

impl KeyConsumer for Recorder {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn handle_key(&mut self, key: Key) -> KeyResult {
        self.keys.push(key);
        match key {
            Key::Byte(b) if self.prefixes.contains(&b) => KeyResult::AwaitMore,
            _ => KeyResult::Complete,
        }
    }
}

/// Feed notation through the mapper and return what reached the handler
pub fn resolve(mapper: &mut Mapper, recorder: &mut Recorder, text: &str) -> String {
    mapper.handle_string(text, true, recorder);
    recorder.drain()
}
