//! Default mappings
//!
//! These are the mappings that ship with the engine. They are loaded from
//! keymap.yaml at project root, or fall back to hardcoded defaults.

use std::path::Path;

use super::binding::KeyMapping;
use super::config::{load_keymap_file, parse_keymap_yaml, MappingEntry};
use super::keymap::Keymap;
use super::types::Mode;
use crate::config_paths;

/// Default keymap YAML embedded at compile time
const DEFAULT_KEYMAP_YAML: &str = include_str!("../../keymap.yaml");

/// Get the embedded default keymap YAML
pub fn get_default_keymap_yaml() -> &'static str {
    DEFAULT_KEYMAP_YAML
}

/// Load and merge keymaps: defaults + user overrides
///
/// Loading order (each layer overrides the previous):
/// 1. Embedded default keymap (compiled into binary)
/// 2. keymap.yaml in current directory (project-local overrides)
/// 3. User config at ~/.config/vimap/keymap.yaml
///
/// Entries without `rhs` remove the matching mapping of earlier layers.
pub fn load_default_keymap() -> Keymap {
    let mut keymap = match parse_keymap_yaml(DEFAULT_KEYMAP_YAML) {
        Ok(entries) => {
            tracing::info!("Loaded embedded default keymap ({} mappings)", entries.len());
            let mut keymap = Keymap::new();
            merge_mappings(&mut keymap, entries);
            keymap
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse embedded keymap: {}, using hardcoded defaults",
                e
            );
            Keymap::with_mappings(default_mappings())
        }
    };

    merge_keymap_file(&mut keymap, Path::new("keymap.yaml"));

    if let Some(user_path) = config_paths::keymap_file() {
        merge_keymap_file(&mut keymap, &user_path);
    }

    keymap
}

/// Merge one keymap file layer if it exists
///
/// A file that fails to load is skipped with a warning. Returns whether the
/// layer was applied.
pub fn merge_keymap_file(keymap: &mut Keymap, path: &Path) -> bool {
    if !path.exists() {
        return false;
    }

    match load_keymap_file(path) {
        Ok(entries) => {
            tracing::info!(
                "Merging keymap from {} ({} mappings)",
                path.display(),
                entries.len()
            );
            merge_mappings(keymap, entries);
            true
        }
        Err(e) => {
            tracing::warn!("Failed to load keymap from {}: {}", path.display(), e);
            false
        }
    }
}

/// Apply keymap file entries on top of a keymap
///
/// - An entry with the same mode and lhs as an existing mapping replaces it
/// - An entry without rhs removes the matching mapping, if any
/// - Otherwise the entry is added
pub fn merge_mappings(keymap: &mut Keymap, entries: Vec<MappingEntry>) {
    for entry in entries {
        match entry.rhs {
            Some(rhs) => keymap.insert(entry.mode, &entry.lhs, &rhs, entry.remap),
            None => {
                if !keymap.delete(entry.mode, &entry.lhs) {
                    tracing::debug!("No {} mapping for {} to remove", entry.mode, entry.lhs);
                }
            }
        }
    }
}

/// Hardcoded defaults, used if the embedded keymap fails to parse
///
/// Arrow keys move in normal mode and walk the history on the command line.
pub fn default_mappings() -> Vec<KeyMapping> {
    vec![
        KeyMapping::from_notation(Mode::NORMAL, "<Up>", "k", false),
        KeyMapping::from_notation(Mode::NORMAL, "<Down>", "j", false),
        KeyMapping::from_notation(Mode::COMMAND, "<Up>", "<C-P>", false),
        KeyMapping::from_notation(Mode::COMMAND, "<Down>", "<C-N>", false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::notation::encode;

    fn entry(lhs: &str, rhs: Option<&str>) -> MappingEntry {
        MappingEntry {
            mode: Mode::NORMAL,
            lhs: lhs.to_string(),
            rhs: rhs.map(String::from),
            remap: true,
        }
    }

    #[test]
    fn test_embedded_keymap_matches_hardcoded_defaults() {
        let entries = parse_keymap_yaml(get_default_keymap_yaml()).unwrap();
        let mut embedded = Keymap::new();
        merge_mappings(&mut embedded, entries);

        let hardcoded = Keymap::with_mappings(default_mappings());
        assert_eq!(embedded.len(), hardcoded.len());
        for mapping in hardcoded.mappings() {
            let other = embedded
                .mappings_for(mapping.mode)
                .iter()
                .find(|m| m.input == mapping.input)
                .expect("mapping missing from keymap.yaml");
            assert_eq!(other, mapping);
        }
    }

    #[test]
    fn test_defaults_are_noremap() {
        let defaults = default_mappings();
        assert_eq!(defaults.len(), 4);
        assert!(defaults.iter().all(|m| !m.remap));
    }

    #[test]
    fn test_command_mode_history_keys() {
        let keymap = Keymap::with_mappings(default_mappings());
        let up = keymap.get(Mode::COMMAND, "<Up>").unwrap();
        assert_eq!(up.replacement, encode("<C-P>"));
        let down = keymap.get(Mode::NORMAL, "<Down>").unwrap();
        assert_eq!(down.replacement, encode("j"));
    }

    #[test]
    fn test_merge_overrides_existing() {
        let mut keymap = Keymap::with_mappings(default_mappings());
        merge_mappings(&mut keymap, vec![entry("<Up>", Some("gg"))]);

        assert_eq!(keymap.len(), 4);
        let up = keymap.get(Mode::NORMAL, "<Up>").unwrap();
        assert_eq!(up.replacement, encode("gg"));
        assert!(up.remap);
    }

    #[test]
    fn test_merge_adds_new_mapping() {
        let mut keymap = Keymap::with_mappings(default_mappings());
        merge_mappings(&mut keymap, vec![entry("gh", Some(":open<CR>"))]);
        assert_eq!(keymap.len(), 5);
    }

    #[test]
    fn test_merge_without_rhs_removes_mapping() {
        let mut keymap = Keymap::with_mappings(default_mappings());
        merge_mappings(&mut keymap, vec![entry("<Up>", None)]);

        assert_eq!(keymap.len(), 3);
        assert!(keymap.get(Mode::NORMAL, "<Up>").is_none());
        assert!(keymap.get(Mode::COMMAND, "<Up>").is_some());
    }

    #[test]
    fn test_merge_keymap_file_layers() {
        let dir = tempfile::tempdir().unwrap();
        let mut keymap = Keymap::with_mappings(default_mappings());

        let missing = dir.path().join("missing.yaml");
        assert!(!merge_keymap_file(&mut keymap, &missing));

        let broken = dir.path().join("broken.yaml");
        std::fs::write(&broken, "mappings: [not: {a list").unwrap();
        assert!(!merge_keymap_file(&mut keymap, &broken));
        assert_eq!(keymap.len(), 4);

        let good = dir.path().join("keymap.yaml");
        std::fs::write(
            &good,
            "mappings:\n  - mode: n\n    lhs: gh\n    rhs: \":open<CR>\"\n",
        )
        .unwrap();
        assert!(merge_keymap_file(&mut keymap, &good));
        assert_eq!(keymap.len(), 5);
    }

    #[test]
    fn test_merge_remove_nonexistent_is_noop() {
        let mut keymap = Keymap::with_mappings(default_mappings());
        merge_mappings(&mut keymap, vec![entry("zz", None)]);
        assert_eq!(keymap.len(), 4);
    }
}
