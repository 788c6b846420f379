//! Keyboard layout tables
//!
//! Two illustrative layouts, each a static list of rows of key caps with a
//! label and a relative width (1.0 = standard key). Layouts only describe
//! what is drawn and what is suppressed; key state is kept per canonical key
//! so it survives switching between them.

use super::{CanonicalKey, NamedKey};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Named layout variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutId {
    /// US/UK QWERTY with function row and navigation block
    #[default]
    Qwerty,
    /// French AZERTY main block
    Azerty,
}

impl LayoutId {
    /// Display name for the layout
    pub fn name(&self) -> &'static str {
        match self {
            Self::Qwerty => "English (QWERTY)",
            Self::Azerty => "French (AZERTY)",
        }
    }

    pub fn all() -> &'static [LayoutId] {
        &[Self::Qwerty, Self::Azerty]
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Qwerty => 0,
            Self::Azerty => 1,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Qwerty,
            _ => Self::Azerty,
        }
    }

    pub fn next(&self) -> Self {
        Self::from_index((self.index() + 1) % Self::all().len())
    }

    /// Static key table for this layout
    pub fn table(&self) -> &'static LayoutTable {
        match self {
            Self::Qwerty => &QWERTY,
            Self::Azerty => &AZERTY,
        }
    }
}

/// A key drawn in a layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyCap {
    /// Identity the key's state is tracked under
    pub key: CanonicalKey,
    /// Label to display
    pub label: &'static str,
    /// Width in units (1.0 = standard key)
    pub width: f32,
}

/// One position in a row: a key, or blank space used for alignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeySlot {
    Key(KeyCap),
    Gap(f32),
}

impl KeySlot {
    pub fn width(&self) -> f32 {
        match self {
            Self::Key(cap) => cap.width,
            Self::Gap(width) => *width,
        }
    }

    pub fn cap(&self) -> Option<&KeyCap> {
        match self {
            Self::Key(cap) => Some(cap),
            Self::Gap(_) => None,
        }
    }
}

/// Static ordered sequence of key rows
#[derive(Debug)]
pub struct LayoutTable {
    pub id: LayoutId,
    pub rows: &'static [&'static [KeySlot]],
}

impl LayoutTable {
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    /// All key caps in row order
    pub fn keys(&self) -> impl Iterator<Item = &'static KeyCap> {
        self.rows.iter().flat_map(|row| row.iter().filter_map(KeySlot::cap))
    }

    pub fn key_set(&self) -> HashSet<CanonicalKey> {
        self.keys().map(|cap| cap.key).collect()
    }

    pub fn key_count(&self) -> usize {
        self.keys().count()
    }

    /// Widest row, in key units
    pub fn max_row_units(&self) -> f32 {
        self.rows
            .iter()
            .map(|row| row.iter().map(KeySlot::width).sum::<f32>())
            .fold(0.0, f32::max)
    }
}

const fn ch(c: char, label: &'static str) -> KeySlot {
    chw(c, label, 1.0)
}

const fn chw(c: char, label: &'static str, width: f32) -> KeySlot {
    KeySlot::Key(KeyCap {
        key: CanonicalKey::Char(c),
        label,
        width,
    })
}

const fn nk(key: NamedKey, label: &'static str) -> KeySlot {
    nkw(key, label, 1.0)
}

const fn nkw(key: NamedKey, label: &'static str, width: f32) -> KeySlot {
    KeySlot::Key(KeyCap {
        key: CanonicalKey::named(key),
        label,
        width,
    })
}

/// English QWERTY table
pub static QWERTY: LayoutTable = LayoutTable {
    id: LayoutId::Qwerty,
    rows: &[
        // Function row
        &[
            nkw(NamedKey::Escape, "Esc", 1.5),
            nk(NamedKey::F1, "F1"),
            nk(NamedKey::F2, "F2"),
            nk(NamedKey::F3, "F3"),
            nk(NamedKey::F4, "F4"),
            nk(NamedKey::F5, "F5"),
            nk(NamedKey::F6, "F6"),
            nk(NamedKey::F7, "F7"),
            nk(NamedKey::F8, "F8"),
            nk(NamedKey::F9, "F9"),
            nk(NamedKey::F10, "F10"),
            nk(NamedKey::F11, "F11"),
            nk(NamedKey::F12, "F12"),
            nk(NamedKey::NumLock, "NumLk"),
            nk(NamedKey::PrintScreen, "PrtSc"),
            nk(NamedKey::ScrollLock, "ScrLk"),
            nk(NamedKey::Pause, "Pause"),
        ],
        // Number row
        &[
            ch('`', "~ `"),
            ch('1', "1 !"),
            ch('2', "2 @"),
            ch('3', "3 #"),
            ch('4', "4 $"),
            ch('5', "5 %"),
            ch('6', "6 ^"),
            ch('7', "7 &"),
            ch('8', "8 *"),
            ch('9', "9 ("),
            ch('0', "0 )"),
            ch('-', "- _"),
            ch('=', "= +"),
            nkw(NamedKey::Backspace, "⌫ Bksp", 2.2),
            nk(NamedKey::Home, "Home"),
            nk(NamedKey::End, "End"),
        ],
        // Top letter row
        &[
            nkw(NamedKey::Tab, "↹ Tab", 1.7),
            ch('q', "Q"),
            ch('w', "W"),
            ch('e', "E"),
            ch('r', "R"),
            ch('t', "T"),
            ch('y', "Y"),
            ch('u', "U"),
            ch('i', "I"),
            ch('o', "O"),
            ch('p', "P"),
            ch('[', "[ {"),
            ch(']', "] }"),
            chw('\\', "\\ |", 1.3),
            nk(NamedKey::PageUp, "PgUp"),
        ],
        // Home row
        &[
            nkw(NamedKey::CapsLock, "⇪ Caps", 2.0),
            ch('a', "A"),
            ch('s', "S"),
            ch('d', "D"),
            ch('f', "F"),
            ch('g', "G"),
            ch('h', "H"),
            ch('j', "J"),
            ch('k', "K"),
            ch('l', "L"),
            ch(';', "; :"),
            ch('\'', "' \""),
            nkw(NamedKey::Enter, "⏎ Enter", 2.0),
            nk(NamedKey::PageDown, "PgDn"),
        ],
        // Shift row
        &[
            nkw(NamedKey::ShiftLeft, "⇧ Shift", 2.5),
            ch('z', "Z"),
            ch('x', "X"),
            ch('c', "C"),
            ch('v', "V"),
            ch('b', "B"),
            ch('n', "N"),
            ch('m', "M"),
            ch(',', ", <"),
            ch('.', ". >"),
            ch('/', "/ ?"),
            nkw(NamedKey::ShiftRight, "⇧ Shift", 3.0),
            KeySlot::Gap(0.25),
            nk(NamedKey::Up, "↑"),
        ],
        // Bottom row
        &[
            nkw(NamedKey::ControlLeft, "Ctrl", 1.3),
            nkw(NamedKey::SuperLeft, "❖ Super", 1.7),
            nkw(NamedKey::AltLeft, "Alt", 1.3),
            nkw(NamedKey::Space, "Space", 7.0),
            nkw(NamedKey::AltRight, "Alt", 1.3),
            nkw(NamedKey::Menu, "Menu", 1.3),
            nk(NamedKey::Insert, "Ins"),
            nk(NamedKey::Delete, "Del"),
            nk(NamedKey::Left, "←"),
            nk(NamedKey::Down, "↓"),
            nk(NamedKey::Right, "→"),
        ],
    ],
};

/// French AZERTY table
pub static AZERTY: LayoutTable = LayoutTable {
    id: LayoutId::Azerty,
    rows: &[
        // Number row (unshifted characters)
        &[
            ch('²', "²"),
            ch('&', "1 &"),
            ch('é', "2 é"),
            ch('"', "3 \""),
            ch('\'', "4 '"),
            ch('(', "5 ("),
            ch('-', "6 -"),
            ch('è', "7 è"),
            ch('_', "8 _"),
            ch('ç', "9 ç"),
            ch('à', "0 à"),
            ch(')', ")"),
            ch('=', "= +"),
            nkw(NamedKey::Backspace, "⌫ Bksp", 2.2),
        ],
        // Top letter row
        &[
            nkw(NamedKey::Tab, "↹ Tab", 1.7),
            ch('a', "A"),
            ch('z', "Z"),
            ch('e', "E"),
            ch('r', "R"),
            ch('t', "T"),
            ch('y', "Y"),
            ch('u', "U"),
            ch('i', "I"),
            ch('o', "O"),
            ch('p', "P"),
            ch('^', "^ ¨"),
            ch('$', "$ £"),
            chw('*', "* µ", 1.3),
        ],
        // Home row
        &[
            nkw(NamedKey::CapsLock, "⇪ Caps", 2.0),
            ch('q', "Q"),
            ch('s', "S"),
            ch('d', "D"),
            ch('f', "F"),
            ch('g', "G"),
            ch('h', "H"),
            ch('j', "J"),
            ch('k', "K"),
            ch('l', "L"),
            ch('m', "M"),
            ch('ù', "ù %"),
            nkw(NamedKey::Enter, "⏎ Enter", 2.6),
        ],
        // Shift row
        &[
            nkw(NamedKey::ShiftLeft, "⇧ Shift", 2.5),
            ch('<', "< >"),
            ch('w', "W"),
            ch('x', "X"),
            ch('c', "C"),
            ch('v', "V"),
            ch('b', "B"),
            ch('n', "N"),
            ch(',', ","),
            ch(';', ";"),
            ch(':', ": /"),
            nkw(NamedKey::ShiftRight, "⇧ Shift", 3.0),
        ],
        // Bottom row
        &[
            nkw(NamedKey::ControlLeft, "Ctrl", 1.3),
            nkw(NamedKey::SuperLeft, "❖ Super", 1.3),
            nkw(NamedKey::AltLeft, "Alt", 1.3),
            nkw(NamedKey::Space, "Space", 7.0),
            nkw(NamedKey::AltRight, "Alt", 1.3),
            nkw(NamedKey::SuperRight, "❖ Super", 1.3),
            nkw(NamedKey::ControlRight, "Ctrl", 1.3),
        ],
    ],
};
