//! Toolkit-independent keyboard input.

pub mod input;

pub use input::{Key, KeyEvent, Modifiers, UnsupportedKey};
