//! Adapter to convert host key presses to engine keys

use super::notation::ctrl_byte;
use super::types::{Key, KeyCode, Keystroke, SpecialKey};

/// Convert a host key press into the keys the engine sees
///
/// Returns None for keys the engine has no encoding for, so the host can
/// handle them itself.
pub fn keys_from_keystroke(stroke: &Keystroke) -> Option<Vec<Key>> {
    let mods = stroke.mods;
    if mods.alt() {
        return None;
    }

    let key = match stroke.key {
        KeyCode::Char(c) if mods.ctrl() => {
            if !c.is_ascii() {
                return None;
            }
            Key::Byte(ctrl_byte(c as u8)?)
        }
        KeyCode::Char(c) => {
            let mut buf = [0u8; 4];
            return Some(c.encode_utf8(&mut buf).bytes().map(Key::Byte).collect());
        }

        KeyCode::Tab if mods.shift() => Key::Special(SpecialKey::ShiftTab),
        KeyCode::Tab => Key::TAB,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::CR,
        KeyCode::Escape => Key::ESC,
        KeyCode::Backspace => Key::BS,
        KeyCode::Space => Key::SPACE,

        KeyCode::Up => Key::Special(SpecialKey::Up),
        KeyCode::Down => Key::Special(SpecialKey::Down),
        KeyCode::Left => Key::Special(SpecialKey::Left),
        KeyCode::Right => Key::Special(SpecialKey::Right),
        KeyCode::F(n @ 1..=12) if mods.ctrl() => Key::Special(SpecialKey::CtrlF(n)),
        KeyCode::F(n @ 1..=12) => Key::Special(SpecialKey::F(n)),

        _ => return None,
    };

    Some(vec![key])
}
