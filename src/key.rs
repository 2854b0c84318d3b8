//! Key identifiers
//!
//! Key presses arrive either as a printable character or as a named key
//! (`"Escape"`, `"Enter"`, `"ArrowUp"`...), the same split a browser's
//! `KeyboardEvent.key` uses. Only character keys are buffered for matching;
//! named keys are compared by identity against the reserved interrupt key.

use std::fmt;

/// Interrupt key used when none is configured
pub const DEFAULT_INTERRUPT_KEY: &str = "Escape";

/// A single key press
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable character (space included)
    Char(char),
    /// Named, non-printable key
    Named(String),
}

impl Key {
    /// Parse a key from its name.
    ///
    /// A single-character name is a character key, anything else is a named key.
    /// `"Space"` and `"Spacebar"` are accepted as aliases for `' '`.
    pub fn from_name(name: &str) -> Self {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Key::Char(c),
            _ if name.eq_ignore_ascii_case("space") || name.eq_ignore_ascii_case("spacebar") => {
                Key::Char(' ')
            }
            _ => Key::Named(name.to_string()),
        }
    }

    /// Returns true for character keys
    pub fn is_char(&self) -> bool {
        matches!(self, Key::Char(_))
    }

    /// Whether this key is the key called `name`.
    ///
    /// Character keys compare exactly, named keys ignore ASCII case so that
    /// `"escape"` in a config file still means `"Escape"`.
    pub fn matches_name(&self, name: &str) -> bool {
        match self {
            Key::Char(c) => {
                let mut chars = name.chars();
                chars.next() == Some(*c) && chars.next().is_none()
            }
            Key::Named(own) => own.eq_ignore_ascii_case(name),
        }
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Key::Char(c)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(' ') => f.write_str("Space"),
            Key::Char(c) => write!(f, "{c}"),
            Key::Named(name) => f.write_str(name),
        }
    }
}

/// Lower-cased form used for buffering and pattern comparison.
///
/// Lower-cases one character at a time, the same way typed keys are
/// buffered, so context-dependent forms (a word-final `Σ`) never appear.
pub fn normalize(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}
