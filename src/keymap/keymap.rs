//! Keymap struct for storing and looking up mode-scoped mappings

use std::collections::HashMap;

use super::binding::KeyMapping;
use super::notation::encode;
use super::types::{Key, Mode};

/// Result of looking up pending keys in the keymap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult<'a> {
    /// Longest mapping whose lhs is a prefix of the pending keys
    pub best: Option<&'a KeyMapping>,
    /// Some longer mapping could still match if more keys arrive
    pub ambiguous: bool,
}

/// The keymap stores all mappings, grouped by mode
///
/// Within a mode there is at most one mapping per lhs.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    modes: HashMap<Mode, Vec<KeyMapping>>,
}

impl Keymap {
    /// Create an empty keymap
    pub fn new() -> Self {
        Self {
            modes: HashMap::new(),
        }
    }

    /// Create a keymap with the given mappings, later ones replacing earlier
    pub fn with_mappings(mappings: Vec<KeyMapping>) -> Self {
        let mut keymap = Self::new();
        for mapping in mappings {
            keymap.add_mapping(mapping);
        }
        keymap
    }

    /// Insert a mapping from key notation, replacing any mapping with the
    /// same lhs in that mode
    pub fn insert(&mut self, mode: Mode, lhs: &str, rhs: &str, remap: bool) {
        self.add_mapping(KeyMapping::from_notation(mode, lhs, rhs, remap));
    }

    /// Insert an already encoded mapping
    pub fn add_mapping(&mut self, mapping: KeyMapping) {
        if mapping.input.is_empty() {
            tracing::warn!("Ignoring {} mapping with empty lhs", mapping.mode);
            return;
        }

        tracing::debug!("map {}", mapping.display_string());

        let entries = self.modes.entry(mapping.mode).or_default();
        entries.retain(|m| m.input != mapping.input);
        entries.push(mapping);
    }

    /// Remove the mapping for `lhs` in `mode`
    ///
    /// Returns whether a mapping was removed.
    pub fn delete(&mut self, mode: Mode, lhs: &str) -> bool {
        self.remove_keys(mode, &encode(lhs))
    }

    /// Remove the mapping for already encoded `input` in `mode`
    pub fn remove_keys(&mut self, mode: Mode, input: &[Key]) -> bool {
        let Some(entries) = self.modes.get_mut(&mode) else {
            return false;
        };

        let Some(idx) = entries.iter().position(|m| m.input == input) else {
            return false;
        };

        let removed = entries.remove(idx);
        tracing::debug!("unmap {}", removed.display_string());
        true
    }

    /// Remove every mapping of a mode, returning how many were removed
    pub fn clear_mode(&mut self, mode: Mode) -> usize {
        self.modes.remove(&mode).map(|m| m.len()).unwrap_or(0)
    }

    /// Look up pending keys in `mode`
    ///
    /// The lookup is ambiguous if `pending` is a strict prefix of some lhs.
    /// The best match is the longest lhs that `pending` starts with.
    pub fn find_matches(&self, mode: Mode, pending: &[Key]) -> MatchResult<'_> {
        let mut result = MatchResult {
            best: None,
            ambiguous: false,
        };

        let Some(entries) = self.modes.get(&mode) else {
            return result;
        };

        for mapping in entries {
            if mapping.extends(pending) {
                result.ambiguous = true;
            }

            if mapping.matches_prefix_of(pending)
                && result
                    .best
                    .map_or(true, |best| best.input.len() < mapping.input.len())
            {
                result.best = Some(mapping);
            }
        }

        result
    }

    /// Get the mapping for `lhs` in `mode`
    pub fn get(&self, mode: Mode, lhs: &str) -> Option<&KeyMapping> {
        let input = encode(lhs);
        self.modes
            .get(&mode)?
            .iter()
            .find(|m| m.is_for(mode, &input))
    }

    /// All mappings of a mode, in insertion order
    pub fn mappings_for(&self, mode: Mode) -> &[KeyMapping] {
        self.modes.get(&mode).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All mappings, grouped by mode (modes sorted by tag)
    pub fn mappings(&self) -> Vec<&KeyMapping> {
        let mut modes: Vec<&Mode> = self.modes.keys().collect();
        modes.sort();
        modes
            .into_iter()
            .flat_map(|mode| self.modes[mode].iter())
            .collect()
    }

    /// Total number of mappings
    pub fn len(&self) -> usize {
        self.modes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Mode = Mode('t');

    fn keymap() -> Keymap {
        let mut keymap = Keymap::new();
        keymap.insert(T, "a", "[a]", false);
        keymap.insert(T, "ab", "[ab]", false);
        keymap.insert(T, "foobar", "[baz]", false);
        keymap
    }

    #[test]
    fn test_insert_and_get() {
        let keymap = keymap();
        assert_eq!(keymap.len(), 3);
        assert_eq!(keymap.get(T, "ab").unwrap().replacement, encode("[ab]"));
        assert!(keymap.get(Mode::NORMAL, "ab").is_none());
    }

    #[test]
    fn test_insert_replaces_duplicate_lhs() {
        let mut keymap = Keymap::new();
        keymap.insert(T, "x", "[1]", false);
        keymap.insert(T, "x", "[2]", true);

        assert_eq!(keymap.mappings_for(T).len(), 1);
        let mapping = keymap.get(T, "x").unwrap();
        assert_eq!(mapping.replacement, encode("[2]"));
        assert!(mapping.remap);
    }

    #[test]
    fn test_duplicate_detection_uses_encoding() {
        let mut keymap = Keymap::new();
        keymap.insert(T, "<Tab>", "[1]", false);
        keymap.insert(T, "<C-I>", "[2]", false);

        assert_eq!(keymap.len(), 1);
        assert_eq!(keymap.get(T, "<Tab>").unwrap().replacement, encode("[2]"));
    }

    #[test]
    fn test_same_lhs_in_different_modes() {
        let mut keymap = Keymap::new();
        keymap.insert(Mode::NORMAL, "<Up>", "k", false);
        keymap.insert(Mode::COMMAND, "<Up>", "<C-P>", false);

        assert_eq!(keymap.len(), 2);
        assert_eq!(keymap.get(Mode::NORMAL, "<Up>").unwrap().replacement, encode("k"));
    }

    #[test]
    fn test_empty_lhs_is_ignored() {
        let mut keymap = Keymap::new();
        keymap.insert(T, "", "x", false);
        assert!(keymap.is_empty());
    }

    #[test]
    fn test_delete_twice() {
        let mut keymap = keymap();
        assert!(keymap.delete(T, "ab"));
        assert!(!keymap.delete(T, "ab"));
        assert_eq!(keymap.len(), 2);
        assert!(!keymap.delete(Mode::NORMAL, "a"));
    }

    #[test]
    fn test_longest_prefix_wins() {
        let keymap = keymap();
        let result = keymap.find_matches(T, &encode("ab"));
        assert!(!result.ambiguous);
        assert_eq!(result.best.unwrap().replacement, encode("[ab]"));

        let result = keymap.find_matches(T, &encode("abc"));
        assert_eq!(result.best.unwrap().replacement, encode("[ab]"));
    }

    #[test]
    fn test_ambiguous_prefix() {
        let keymap = keymap();

        let result = keymap.find_matches(T, &encode("a"));
        assert!(result.ambiguous, "a could still become ab");
        assert_eq!(result.best.unwrap().replacement, encode("[a]"));

        let result = keymap.find_matches(T, &encode("foob"));
        assert!(result.ambiguous);
        assert!(result.best.is_none());
    }

    #[test]
    fn test_no_match() {
        let keymap = keymap();
        let result = keymap.find_matches(T, &encode("xyz"));
        assert!(!result.ambiguous);
        assert!(result.best.is_none());

        let result = keymap.find_matches(Mode::NORMAL, &encode("a"));
        assert!(result.best.is_none());
    }

    #[test]
    fn test_clear_mode() {
        let mut keymap = keymap();
        keymap.insert(Mode::NORMAL, "j", "gj", false);

        assert_eq!(keymap.clear_mode(T), 3);
        assert_eq!(keymap.len(), 1);
        assert_eq!(keymap.clear_mode(T), 0);
    }

    #[test]
    fn test_mappings_sorted_by_mode() {
        let mut keymap = Keymap::new();
        keymap.insert(Mode::NORMAL, "j", "gj", false);
        keymap.insert(Mode::COMMAND, "<Up>", "<C-P>", false);

        let modes: Vec<Mode> = keymap.mappings().iter().map(|m| m.mode).collect();
        assert_eq!(modes, vec![Mode::COMMAND, Mode::NORMAL]);
    }
}
