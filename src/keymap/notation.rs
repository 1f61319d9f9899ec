//! Key notation: translation between `<C-F>`/`<Tab>` style text and engine keys
//!
//! Text is processed byte-wise. Anything that isn't a recognized bracketed
//! name is copied through literally, so encoding never fails.
//!
//! Hosts that keep keys as raw bytes can use [`encode_bytes`] and
//! [`decode_bytes`]. In that form a special key is the 3-byte sequence
//! `CSI group code` (e.g. `0x80 'k' 'u'` for `<Up>`), and a literal 0x80 byte
//! is escaped as `CSI 0xfe 'X'`.

use super::types::{Key, SpecialKey, CSI};

/// Second byte of the escape for a literal CSI byte
const CSI_ESCAPE: u8 = 0xfe;
const CSI_FILLER: u8 = b'X';

/// Encode key notation into engine keys
pub fn encode(text: &str) -> Vec<Key> {
    let bytes = text.as_bytes();
    let mut keys = Vec::with_capacity(bytes.len());

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'<' {
            keys.push(Key::Byte(bytes[i]));
            i += 1;
            continue;
        }

        let len = label_len(&bytes[i..]);
        let label = &bytes[i..i + len];
        match parse_label(label) {
            Some(key) => keys.push(key),
            None => keys.extend(label.iter().copied().map(Key::Byte)),
        }
        i += len;
    }

    keys
}

/// Length of the label starting at `<`, including the closing `>` if found.
/// Scanning stops before another `<` or a space.
fn label_len(bytes: &[u8]) -> usize {
    let mut len = 1;
    while len < bytes.len() {
        match bytes[len] {
            b'<' | b' ' => return len,
            b'>' => return len + 1,
            _ => len += 1,
        }
    }
    len
}

fn parse_label(label: &[u8]) -> Option<Key> {
    if label.len() < 3 || label[label.len() - 1] != b'>' {
        return None;
    }
    let name = &label[1..label.len() - 1];

    if let [b'C' | b'c', b'-', ch] = name {
        if let Some(byte) = ctrl_byte(*ch) {
            return Some(Key::Byte(byte));
        }
    }

    named_key(name)
}

/// Control code for `<C-X>`, terminal style
pub fn ctrl_byte(ch: u8) -> Option<u8> {
    match ch {
        // A-Z [ \ ]
        0x41..=0x5d => Some(ch - 0x40),
        // a-z
        0x61..=0x7a => Some(ch - 0x60),
        _ => None,
    }
}

fn named_key(name: &[u8]) -> Option<Key> {
    let lower = name.to_ascii_lowercase();
    match lower.as_slice() {
        b"tab" => Some(Key::TAB),
        b"cr" | b"enter" | b"return" => Some(Key::CR),
        b"esc" => Some(Key::ESC),
        b"bs" => Some(Key::BS),
        b"space" => Some(Key::SPACE),
        b"lt" => Some(Key::Byte(b'<')),

        b"up" => Some(Key::Special(SpecialKey::Up)),
        b"down" => Some(Key::Special(SpecialKey::Down)),
        b"left" => Some(Key::Special(SpecialKey::Left)),
        b"right" => Some(Key::Special(SpecialKey::Right)),
        b"s-tab" => Some(Key::Special(SpecialKey::ShiftTab)),

        [b'f', digits @ ..] => function_key(digits).map(|n| Key::Special(SpecialKey::F(n))),
        [b'c', b'-', b'f', digits @ ..] => {
            function_key(digits).map(|n| Key::Special(SpecialKey::CtrlF(n)))
        }
        _ => None,
    }
}

/// Number of a function key name, 1-12
fn function_key(digits: &[u8]) -> Option<u8> {
    if digits.is_empty() || digits.len() > 2 || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let n = digits.iter().fold(0u8, |n, d| n * 10 + (d - b'0'));
    (1..=12).contains(&n).then_some(n)
}

/// Render keys for the status bar "show command" area
///
/// Control codes become `^X`, special keys their `<Name>` label and
/// non-ASCII bytes `<xx>` in hex.
pub fn decode_for_display(keys: &[Key]) -> String {
    keys.iter().map(|key| display_key(*key)).collect()
}

/// Render a single key, see [`decode_for_display`]
pub fn display_key(key: Key) -> String {
    match key {
        Key::Byte(0x7f) => "^?".to_string(),
        Key::Byte(b) if b < 0x20 => format!("^{}", (b ^ 0x40) as char),
        Key::Byte(b) if b >= 0x80 => format!("<{:02x}>", b),
        Key::Byte(b) => (b as char).to_string(),
        Key::Special(special) => special.label(),
    }
}

/// Flatten keys into the raw byte encoding
pub fn encode_bytes(keys: &[Key]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(keys.len());
    for key in keys {
        match *key {
            Key::Byte(CSI) => bytes.extend_from_slice(&[CSI, CSI_ESCAPE, CSI_FILLER]),
            Key::Byte(b) => bytes.push(b),
            Key::Special(special) => {
                let [group, code] = special.termcap();
                bytes.extend_from_slice(&[CSI, group, code]);
            }
        }
    }
    bytes
}

/// Parse the raw byte encoding back into keys
///
/// A CSI byte that doesn't start a valid 3-byte sequence is kept as a
/// plain byte.
pub fn decode_bytes(bytes: &[u8]) -> Vec<Key> {
    let mut keys = Vec::with_capacity(bytes.len());

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == CSI && i + 2 < bytes.len() {
            let (group, code) = (bytes[i + 1], bytes[i + 2]);
            if group == CSI_ESCAPE && code == CSI_FILLER {
                keys.push(Key::Byte(CSI));
                i += 3;
                continue;
            }
            if let Some(special) = SpecialKey::from_termcap(group, code) {
                keys.push(Key::Special(special));
                i += 3;
                continue;
            }
        }
        keys.push(Key::Byte(bytes[i]));
        i += 1;
    }

    keys
}
