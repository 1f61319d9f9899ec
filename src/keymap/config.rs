//! YAML configuration parsing for keymaps
//!
//! Parses keymap.yaml files into MappingEntry values.

use std::path::Path;

use serde::Deserialize;

use super::command::MapCommand;
use super::types::Mode;

/// Root structure of a keymap YAML file
#[derive(Debug, Deserialize)]
pub struct KeymapConfig {
    #[serde(default)]
    pub mappings: Vec<MappingConfig>,
}

/// A single mapping entry as written in YAML
#[derive(Debug, Deserialize)]
pub struct MappingConfig {
    pub mode: String,
    pub lhs: String,
    /// Missing rhs removes the mapping
    #[serde(default)]
    pub rhs: Option<String>,
    #[serde(default)]
    pub noremap: bool,
}

/// A validated keymap file entry, lhs and rhs still in key notation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub mode: Mode,
    pub lhs: String,
    pub rhs: Option<String>,
    pub remap: bool,
}

impl MappingEntry {
    /// Check if this entry removes a mapping instead of adding one
    pub fn is_unmap(&self) -> bool {
        self.rhs.is_none()
    }

    /// The equivalent map command
    pub fn to_command(&self) -> MapCommand {
        match &self.rhs {
            Some(rhs) => MapCommand::Map {
                mode: self.mode,
                lhs: self.lhs.clone(),
                rhs: rhs.clone(),
                remap: self.remap,
            },
            None => MapCommand::Unmap {
                mode: self.mode,
                lhs: self.lhs.clone(),
            },
        }
    }
}

/// Load mapping entries from a YAML file
pub fn load_keymap_file(path: &Path) -> Result<Vec<MappingEntry>, KeymapError> {
    let content = std::fs::read_to_string(path).map_err(|e| KeymapError::IoError(e.to_string()))?;

    parse_keymap_yaml(&content)
}

/// Parse mapping entries from YAML string
pub fn parse_keymap_yaml(yaml: &str) -> Result<Vec<MappingEntry>, KeymapError> {
    let config: KeymapConfig =
        serde_yaml::from_str(yaml).map_err(|e| KeymapError::ParseError(e.to_string()))?;

    let mut entries = Vec::with_capacity(config.mappings.len());
    for entry in config.mappings {
        let mode = parse_mode(&entry.mode)?;
        if entry.lhs.is_empty() {
            return Err(KeymapError::MissingLhs(format!("{} mapping", mode)));
        }

        entries.push(MappingEntry {
            mode,
            lhs: entry.lhs,
            rhs: entry.rhs,
            remap: !entry.noremap,
        });
    }

    Ok(entries)
}

/// Parse a mode tag: a single ASCII letter such as `n`, `i` or `c`
pub fn parse_mode(mode: &str) -> Result<Mode, KeymapError> {
    let mut chars = mode.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(Mode(c)),
        _ => Err(KeymapError::InvalidMode(mode.to_string())),
    }
}

/// Errors that can occur when parsing keymaps and map commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeymapError {
    IoError(String),
    ParseError(String),
    InvalidMode(String),
    UnknownCommand(String),
    MissingLhs(String),
    MissingRhs(String),
}

impl std::fmt::Display for KeymapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeymapError::IoError(e) => write!(f, "IO error: {}", e),
            KeymapError::ParseError(e) => write!(f, "Parse error: {}", e),
            KeymapError::InvalidMode(m) => write!(f, "Invalid mode: {}", m),
            KeymapError::UnknownCommand(c) => write!(f, "Not an editor command: {}", c),
            KeymapError::MissingLhs(c) => write!(f, "Missing key sequence: {}", c),
            KeymapError::MissingRhs(c) => write!(f, "Missing replacement: {}", c),
        }
    }
}

impl std::error::Error for KeymapError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
mappings:
  - mode: n
    lhs: "<Up>"
    rhs: "k"
    noremap: true
  - mode: i
    lhs: "jk"
    rhs: "<Esc>"
"#;

        let entries = parse_keymap_yaml(yaml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].mode, Mode::NORMAL);
        assert!(!entries[0].remap);
        assert_eq!(entries[1].mode, Mode::INSERT);
        assert!(entries[1].remap, "remap is the default");
    }

    #[test]
    fn test_missing_rhs_is_unmap() {
        let yaml = r#"
mappings:
  - mode: n
    lhs: "gh"
"#;
        let entries = parse_keymap_yaml(yaml).unwrap();
        assert!(entries[0].is_unmap());
        assert_eq!(
            entries[0].to_command(),
            MapCommand::Unmap {
                mode: Mode::NORMAL,
                lhs: "gh".into()
            }
        );
    }

    #[test]
    fn test_empty_file_has_no_mappings() {
        assert!(parse_keymap_yaml("{}").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_mode() {
        let yaml = r#"
mappings:
  - mode: normal
    lhs: "a"
    rhs: "b"
"#;
        assert_eq!(
            parse_keymap_yaml(yaml),
            Err(KeymapError::InvalidMode("normal".into()))
        );
    }

    #[test]
    fn test_empty_lhs() {
        let yaml = r#"
mappings:
  - mode: n
    lhs: ""
    rhs: "b"
"#;
        assert!(matches!(
            parse_keymap_yaml(yaml),
            Err(KeymapError::MissingLhs(_))
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            parse_keymap_yaml("mappings: [ {"),
            Err(KeymapError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode("c"), Ok(Mode::COMMAND));
        assert!(parse_mode("").is_err());
        assert!(parse_mode("1").is_err());
    }
}
