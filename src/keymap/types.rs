//! Core types for the mapping engine: Key, SpecialKey, Mode, and the
//! host-facing Keystroke description

use std::fmt;

/// Marker byte that starts a 3-byte special key sequence in the flat byte
/// encoding. Never produced for literal text.
pub const CSI: u8 = 0x80;

/// Named non-printable keys that have no single-byte encoding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecialKey {
    Up,
    Down,
    Left,
    Right,
    ShiftTab,
    /// Function keys F1-F12
    F(u8),
    /// Function keys F1-F12 with Ctrl held
    CtrlF(u8),
}

impl SpecialKey {
    /// Termcap-style two byte name, e.g. `ku` for Up, `k1` for F1
    pub const fn termcap(self) -> [u8; 2] {
        match self {
            SpecialKey::Up => *b"ku",
            SpecialKey::Down => *b"kd",
            SpecialKey::Left => *b"kl",
            SpecialKey::Right => *b"kr",
            SpecialKey::ShiftTab => *b"kB",
            SpecialKey::F(10) => *b"k;",
            SpecialKey::F(11) => *b"F1",
            SpecialKey::F(12) => *b"F2",
            SpecialKey::F(n) => [b'k', b'0'.wrapping_add(n)],
            // No termcap name exists; `c1`..`c9`, `c:`, `c;`, `c<`
            SpecialKey::CtrlF(n) => [b'c', b'0'.wrapping_add(n)],
        }
    }

    /// Inverse of [`SpecialKey::termcap`]
    pub fn from_termcap(group: u8, code: u8) -> Option<SpecialKey> {
        match (group, code) {
            (b'k', b'u') => Some(SpecialKey::Up),
            (b'k', b'd') => Some(SpecialKey::Down),
            (b'k', b'l') => Some(SpecialKey::Left),
            (b'k', b'r') => Some(SpecialKey::Right),
            (b'k', b'B') => Some(SpecialKey::ShiftTab),
            (b'k', b';') => Some(SpecialKey::F(10)),
            (b'F', b'1') => Some(SpecialKey::F(11)),
            (b'F', b'2') => Some(SpecialKey::F(12)),
            (b'k', n @ b'1'..=b'9') => Some(SpecialKey::F(n - b'0')),
            (b'c', n @ b'1'..=b'<') => Some(SpecialKey::CtrlF(n - b'0')),
            _ => None,
        }
    }

    /// Label in key notation, e.g. `<S-Tab>`
    pub fn label(self) -> String {
        match self {
            SpecialKey::Up => "<Up>".to_string(),
            SpecialKey::Down => "<Down>".to_string(),
            SpecialKey::Left => "<Left>".to_string(),
            SpecialKey::Right => "<Right>".to_string(),
            SpecialKey::ShiftTab => "<S-Tab>".to_string(),
            SpecialKey::F(n) => format!("<F{}>", n),
            SpecialKey::CtrlF(n) => format!("<C-F{}>", n),
        }
    }
}

/// One logical key as it flows through the mapping engine
///
/// Special keys are their own variant, so the CSI marker can never be
/// confused with a literal byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A plain byte: printable ASCII, a control code or a raw UTF-8 byte
    Byte(u8),
    /// A named key without a single-byte encoding
    Special(SpecialKey),
}

impl Key {
    pub const TAB: Key = Key::Byte(0x09);
    pub const CR: Key = Key::Byte(0x0d);
    pub const ESC: Key = Key::Byte(0x1b);
    pub const BS: Key = Key::Byte(0x08);
    pub const SPACE: Key = Key::Byte(0x20);

    /// Integer key code handed to mode handlers
    ///
    /// Bytes keep their value, special keys are negative:
    /// `-(group + (code << 8))`.
    pub const fn code(self) -> i32 {
        match self {
            Key::Byte(b) => b as i32,
            Key::Special(special) => {
                let [group, code] = special.termcap();
                -((group as i32) + ((code as i32) << 8))
            }
        }
    }

    /// Inverse of [`Key::code`]
    pub fn from_code(code: i32) -> Option<Key> {
        if (0..=0xff).contains(&code) {
            return Some(Key::Byte(code as u8));
        }
        if code >= 0 {
            return None;
        }
        let raw = code.checked_neg()?;
        let group = (raw & 0xff) as u8;
        let termcode = ((raw >> 8) & 0xff) as u8;
        SpecialKey::from_termcap(group, termcode).map(Key::Special)
    }

    /// Check if this is an ASCII control code (including DEL)
    pub fn is_ctrl(self) -> bool {
        matches!(self, Key::Byte(b) if b < 0x20 || b == 0x7f)
    }
}

impl From<u8> for Key {
    fn from(b: u8) -> Self {
        Key::Byte(b)
    }
}

impl From<SpecialKey> for Key {
    fn from(special: SpecialKey) -> Self {
        Key::Special(special)
    }
}

/// Tag of the modal context a mapping belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mode(pub char);

impl Mode {
    pub const NORMAL: Mode = Mode('n');
    pub const INSERT: Mode = Mode('i');
    pub const COMMAND: Mode = Mode('c');

    pub const fn id(self) -> char {
        self.0
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::NORMAL
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Modifier keys as a bitfield for efficient storage and comparison
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, shift: bool, alt: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b0001;
        }
        if shift {
            bits |= 0b0010;
        }
        if alt {
            bits |= 0b0100;
        }
        Modifiers(bits)
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0001 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b0010 != 0
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0100 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl() {
            parts.push("Ctrl");
        }
        if self.shift() {
            parts.push("Shift");
        }
        if self.alt() {
            parts.push("Alt");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A physical or logical key as reported by the host toolkit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key, case preserved
    Char(char),

    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,

    Up,
    Down,
    Left,
    Right,

    Home,
    End,
    PageUp,
    PageDown,
    Insert,

    // Function keys
    F(u8), // F1-F24

    NumpadEnter,
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::Enter => write!(f, "Enter"),
            KeyCode::Escape => write!(f, "Escape"),
            KeyCode::Tab => write!(f, "Tab"),
            KeyCode::Backspace => write!(f, "Backspace"),
            KeyCode::Delete => write!(f, "Delete"),
            KeyCode::Space => write!(f, "Space"),
            KeyCode::Up => write!(f, "Up"),
            KeyCode::Down => write!(f, "Down"),
            KeyCode::Left => write!(f, "Left"),
            KeyCode::Right => write!(f, "Right"),
            KeyCode::Home => write!(f, "Home"),
            KeyCode::End => write!(f, "End"),
            KeyCode::PageUp => write!(f, "PageUp"),
            KeyCode::PageDown => write!(f, "PageDown"),
            KeyCode::Insert => write!(f, "Insert"),
            KeyCode::F(n) => write!(f, "F{}", n),
            KeyCode::NumpadEnter => write!(f, "NumEnter"),
        }
    }
}

/// A single keystroke from the host: a key with modifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Keystroke {
    pub key: KeyCode,
    pub mods: Modifiers,
}

impl Keystroke {
    pub const fn new(key: KeyCode, mods: Modifiers) -> Self {
        Self { key, mods }
    }

    /// Create a keystroke with no modifiers
    pub const fn key(key: KeyCode) -> Self {
        Self {
            key,
            mods: Modifiers::NONE,
        }
    }

    /// Create a keystroke for a typed character
    pub const fn char(c: char) -> Self {
        Self {
            key: KeyCode::Char(c),
            mods: Modifiers::NONE,
        }
    }

    /// Create a Ctrl+character keystroke
    pub const fn ctrl(c: char) -> Self {
        Self {
            key: KeyCode::Char(c),
            mods: Modifiers::CTRL,
        }
    }
}

impl fmt::Display for Keystroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.mods.is_empty() {
            write!(f, "{}+{}", self.mods, self.key)
        } else {
            write!(f, "{}", self.key)
        }
    }
}
