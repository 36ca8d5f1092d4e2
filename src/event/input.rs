//! Keyboard input, decoupled from the toolkit.
//!
//! Shortcut tables store key sequences as strings: either a modifier chord
//! such as `Ctrl+P`, or a platform standard-key name such as `copy` or
//! `select-all`. [`KeyEvent::key_sequence`] and [`KeyEvent::standard_key`]
//! produce both spellings so a pressed key can be matched against either.
//! Crossterm events convert via `TryFrom`, so hosts built on crossterm can
//! feed the window shell directly.

use std::fmt;
use std::ops::{BitAnd, BitOr};

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(' ') => f.write_str("Space"),
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            Key::Enter => f.write_str("Return"),
            Key::Escape => f.write_str("Esc"),
            Key::Tab => f.write_str("Tab"),
            Key::BackTab => f.write_str("Backtab"),
            Key::Backspace => f.write_str("Backspace"),
            Key::Delete => f.write_str("Del"),
            Key::Left => f.write_str("Left"),
            Key::Right => f.write_str("Right"),
            Key::Up => f.write_str("Up"),
            Key::Down => f.write_str("Down"),
            Key::Home => f.write_str("Home"),
            Key::End => f.write_str("End"),
            Key::PageUp => f.write_str("PgUp"),
            Key::PageDown => f.write_str("PgDown"),
            Key::F(n) => write!(f, "F{n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Modifier key bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(2);
    pub const ALT: Modifiers = Modifiers(4);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn control(self) -> bool {
        self.contains(Modifiers::CTRL)
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitAnd for Modifiers {
    type Output = Modifiers;
    fn bitand(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// KeyEvent
// ---------------------------------------------------------------------------

/// A keyboard event with key and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(code: Key, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Shorthand for a Ctrl chord on a character key.
    pub fn ctrl(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::CTRL)
    }

    /// The chord spelling, e.g. `Ctrl+Shift+Z` or `F5`.
    pub fn key_sequence(&self) -> String {
        let mut out = String::new();
        if self.modifiers.contains(Modifiers::CTRL) {
            out.push_str("Ctrl+");
        }
        if self.modifiers.contains(Modifiers::ALT) {
            out.push_str("Alt+");
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            out.push_str("Shift+");
        }
        out.push_str(&self.code.to_string());
        out
    }

    /// The platform standard-key name this chord stands for, if any.
    pub fn standard_key(&self) -> Option<&'static str> {
        let ctrl = self.modifiers.contains(Modifiers::CTRL);
        let shift = self.modifiers.contains(Modifiers::SHIFT);
        match (self.code, ctrl, shift) {
            (Key::Char(c), true, false) => match c.to_ascii_lowercase() {
                'a' => Some("select-all"),
                'c' => Some("copy"),
                'n' => Some("new"),
                'o' => Some("open"),
                'q' => Some("quit"),
                's' => Some("save"),
                'v' => Some("paste"),
                'w' => Some("close"),
                'x' => Some("cut"),
                'y' => Some("redo"),
                'z' => Some("undo"),
                _ => None,
            },
            (Key::Char(c), true, true) if c.eq_ignore_ascii_case(&'z') => Some("redo"),
            (Key::Delete, false, false) => Some("delete"),
            _ => None,
        }
    }

    /// Whether this is a Ctrl chord on an actual key.
    pub fn is_control_chord(&self) -> bool {
        self.modifiers.control()
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key_sequence())
    }
}

// ---------------------------------------------------------------------------
// Crossterm conversions
// ---------------------------------------------------------------------------

/// A crossterm key code with no counterpart in [`Key`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("key code {0:?} is not supported")]
pub struct UnsupportedKey(pub crossterm::event::KeyCode);

impl From<crossterm::event::KeyModifiers> for Modifiers {
    fn from(m: crossterm::event::KeyModifiers) -> Self {
        use crossterm::event::KeyModifiers as M;

        [(M::SHIFT, Modifiers::SHIFT), (M::CONTROL, Modifiers::CTRL), (M::ALT, Modifiers::ALT)]
            .into_iter()
            .filter(|(flag, _)| m.contains(*flag))
            .fold(Modifiers::NONE, |acc, (_, bit)| acc | bit)
    }
}

impl TryFrom<crossterm::event::KeyCode> for Key {
    type Error = UnsupportedKey;

    fn try_from(code: crossterm::event::KeyCode) -> Result<Self, Self::Error> {
        use crossterm::event::KeyCode as C;

        Ok(match code {
            C::Char(c) => Key::Char(c),
            C::F(n) => Key::F(n),
            C::Enter => Key::Enter,
            C::Esc => Key::Escape,
            C::Tab => Key::Tab,
            C::BackTab => Key::BackTab,
            C::Backspace => Key::Backspace,
            C::Delete => Key::Delete,
            C::Left => Key::Left,
            C::Right => Key::Right,
            C::Up => Key::Up,
            C::Down => Key::Down,
            C::Home => Key::Home,
            C::End => Key::End,
            C::PageUp => Key::PageUp,
            C::PageDown => Key::PageDown,
            other => return Err(UnsupportedKey(other)),
        })
    }
}

impl TryFrom<crossterm::event::KeyEvent> for KeyEvent {
    type Error = UnsupportedKey;

    fn try_from(event: crossterm::event::KeyEvent) -> Result<Self, Self::Error> {
        Ok(KeyEvent::new(event.code.try_into()?, event.modifiers.into()))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
