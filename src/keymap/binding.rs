//! KeyMapping struct representing one `:map`-style mapping

use super::notation::{decode_for_display, encode};
use super::types::{Key, Mode};

/// A single mapping from an input key sequence to its replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMapping {
    /// Mode the mapping is active in
    pub mode: Mode,
    /// Keys that trigger the mapping (lhs)
    pub input: Vec<Key>,
    /// Keys substituted for a full match (rhs)
    pub replacement: Vec<Key>,
    /// Whether the replacement is itself subject to mapping
    pub remap: bool,
}

impl KeyMapping {
    /// Create a mapping from already encoded keys
    pub fn new(mode: Mode, input: Vec<Key>, replacement: Vec<Key>, remap: bool) -> Self {
        Self {
            mode,
            input,
            replacement,
            remap,
        }
    }

    /// Create a mapping from key notation, e.g. `("<C-F>", "<Down>")`
    pub fn from_notation(mode: Mode, lhs: &str, rhs: &str, remap: bool) -> Self {
        Self::new(mode, encode(lhs), encode(rhs), remap)
    }

    /// Check if the mapping triggers on exactly these keys in this mode
    pub fn is_for(&self, mode: Mode, input: &[Key]) -> bool {
        self.mode == mode && self.input == input
    }

    /// Check if the whole lhs is a prefix of `pending`
    pub fn matches_prefix_of(&self, pending: &[Key]) -> bool {
        pending.starts_with(&self.input)
    }

    /// Check if `pending` is a strict prefix of the lhs, so more keys could
    /// still complete this mapping
    pub fn extends(&self, pending: &[Key]) -> bool {
        self.input.len() > pending.len() && self.input.starts_with(pending)
    }

    /// Check if the replacement begins with the lhs itself (`j` -> `jzz`)
    pub fn is_self_prefixed(&self) -> bool {
        self.replacement.starts_with(&self.input)
    }

    /// Get display string for this mapping, e.g. `n* gh :open^M` (`*` marks noremap)
    pub fn display_string(&self) -> String {
        format!(
            "{}{} {} {}",
            self.mode,
            if self.remap { "" } else { "*" },
            decode_for_display(&self.input),
            decode_for_display(&self.replacement)
        )
    }
}
