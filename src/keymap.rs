//! Keystroke normalisation.
//!
//! Raw key events arrive as USB HID keyboard usage IDs. Only keys that
//! produce text matter for rate estimation, so everything is reduced to a
//! [`Symbol`]: a printable character, a space or a newline.

use chrono::{DateTime, Local};
use crossterm::event::KeyCode;
use log::{debug, trace};

/// HID usage IDs (keyboard/keypad page) the ingest path cares about
pub mod usage {
    pub const A: u16 = 4;
    pub const Z: u16 = 29;
    pub const DIGIT_1: u16 = 30;
    pub const DIGIT_9: u16 = 38;
    pub const DIGIT_0: u16 = 39;
    pub const ENTER: u16 = 40;
    pub const ESCAPE: u16 = 41;
    pub const BACKSPACE: u16 = 42;
    pub const TAB: u16 = 43;
    pub const SPACE: u16 = 44;
    pub const MINUS: u16 = 45;
    pub const EQUAL: u16 = 46;
    pub const LEFT_BRACKET: u16 = 47;
    pub const RIGHT_BRACKET: u16 = 48;
    pub const BACKSLASH: u16 = 49;
    pub const SEMICOLON: u16 = 51;
    pub const QUOTE: u16 = 52;
    pub const GRAVE: u16 = 53;
    pub const COMMA: u16 = 54;
    pub const PERIOD: u16 = 55;
    pub const SLASH: u16 = 56;
    pub const KEYPAD_ENTER: u16 = 88;
    pub const LEFT_CONTROL: u16 = 224;
    pub const RIGHT_GUI: u16 = 231;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Char(char),
    Space,
    Newline,
}

impl Symbol {
    /// Space and newline separate words
    pub fn is_boundary(&self) -> bool {
        matches!(self, Symbol::Space | Symbol::Newline)
    }

    pub fn as_char(&self) -> char {
        match self {
            Symbol::Char(c) => *c,
            Symbol::Space => ' ',
            Symbol::Newline => '\n',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyToken {
    pub symbol: Symbol,
    pub timestamp: DateTime<Local>,
}

impl KeyToken {
    pub fn new(symbol: Symbol, timestamp: DateTime<Local>) -> Self {
        Self { symbol, timestamp }
    }
}

/// Outcome of looking up a usage ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    Text(Symbol),
    Control,
    Unknown,
}

pub fn classify(code: u16) -> KeyClass {
    use usage::*;

    let symbol = match code {
        A..=Z => Symbol::Char((b'a' + (code - A) as u8) as char),
        DIGIT_1..=DIGIT_9 => Symbol::Char((b'1' + (code - DIGIT_1) as u8) as char),
        DIGIT_0 => Symbol::Char('0'),
        ENTER | KEYPAD_ENTER => Symbol::Newline,
        SPACE => Symbol::Space,
        MINUS => Symbol::Char('-'),
        EQUAL => Symbol::Char('='),
        LEFT_BRACKET => Symbol::Char('['),
        RIGHT_BRACKET => Symbol::Char(']'),
        BACKSLASH => Symbol::Char('\\'),
        SEMICOLON => Symbol::Char(';'),
        QUOTE => Symbol::Char('\''),
        GRAVE => Symbol::Char('`'),
        COMMA => Symbol::Char(','),
        PERIOD => Symbol::Char('.'),
        SLASH => Symbol::Char('/'),
        ESCAPE | BACKSPACE | TAB | LEFT_CONTROL..=RIGHT_GUI => return KeyClass::Control,
        _ => return KeyClass::Unknown,
    };

    KeyClass::Text(symbol)
}

/// Normalise a raw key press into a token, or drop it.
pub fn ingest(code: u16, timestamp: DateTime<Local>) -> Option<KeyToken> {
    match classify(code) {
        KeyClass::Text(symbol) => Some(KeyToken::new(symbol, timestamp)),
        KeyClass::Control => {
            trace!("ignoring control key (usage {code})");
            None
        }
        KeyClass::Unknown => {
            debug!("unrecognised key (usage {code})");
            None
        }
    }
}

/// Translate a terminal key event into the HID usage ID of the key that
/// most likely produced it. Shifted characters map to their base key.
pub fn usage_from_key_code(code: KeyCode) -> Option<u16> {
    use usage::*;

    match code {
        KeyCode::Enter => Some(ENTER),
        KeyCode::Esc => Some(ESCAPE),
        KeyCode::Backspace => Some(BACKSPACE),
        KeyCode::Tab | KeyCode::BackTab => Some(TAB),
        KeyCode::Char(c) => usage_from_char(c),
        _ => None,
    }
}

fn usage_from_char(c: char) -> Option<u16> {
    use usage::*;

    let lower = c.to_ascii_lowercase();
    let code = match lower {
        'a'..='z' => A + (lower as u8 - b'a') as u16,
        '1'..='9' => DIGIT_1 + (lower as u8 - b'1') as u16,
        '0' | ')' => DIGIT_0,
        '!' => DIGIT_1,
        '@' => DIGIT_1 + 1,
        '#' => DIGIT_1 + 2,
        '$' => DIGIT_1 + 3,
        '%' => DIGIT_1 + 4,
        '^' => DIGIT_1 + 5,
        '&' => DIGIT_1 + 6,
        '*' => DIGIT_1 + 7,
        '(' => DIGIT_9,
        ' ' => SPACE,
        '\n' | '\r' => ENTER,
        '\t' => TAB,
        '-' | '_' => MINUS,
        '=' | '+' => EQUAL,
        '[' | '{' => LEFT_BRACKET,
        ']' | '}' => RIGHT_BRACKET,
        '\\' | '|' => BACKSLASH,
        ';' | ':' => SEMICOLON,
        '\'' | '"' => QUOTE,
        '`' | '~' => GRAVE,
        ',' | '<' => COMMA,
        '.' | '>' => PERIOD,
        '/' | '?' => SLASH,
        _ => return None,
    };
    Some(code)
}
