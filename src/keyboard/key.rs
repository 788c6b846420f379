//! Canonical key identity
//!
//! Maps what the input hook reports for a physical key (the `rdev::Key` plus
//! the text it produced, if any) to the identifier shared by layouts,
//! suppression and latency timing.

use rdev::Key;
use std::fmt;

/// Non-printable keys with a fixed identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamedKey {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
    SuperLeft,
    SuperRight,
    Menu,
    Up,
    Down,
    Left,
    Right,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    CapsLock,
    NumLock,
    ScrollLock,
    PrintScreen,
    Pause,
}

impl NamedKey {
    /// Display name used in the latency log and status bar
    pub fn name(&self) -> &'static str {
        match self {
            Self::Escape => "Escape",
            Self::Enter => "Enter",
            Self::Tab => "Tab",
            Self::Backspace => "Backspace",
            Self::Space => "Space",
            Self::ShiftLeft => "Shift_L",
            Self::ShiftRight => "Shift_R",
            Self::ControlLeft => "Control_L",
            Self::ControlRight => "Control_R",
            Self::AltLeft => "Alt_L",
            Self::AltRight => "Alt_R",
            Self::SuperLeft => "Super_L",
            Self::SuperRight => "Super_R",
            Self::Menu => "Menu",
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Insert => "Insert",
            Self::Delete => "Delete",
            Self::Home => "Home",
            Self::End => "End",
            Self::PageUp => "Page_Up",
            Self::PageDown => "Page_Down",
            Self::F1 => "F1",
            Self::F2 => "F2",
            Self::F3 => "F3",
            Self::F4 => "F4",
            Self::F5 => "F5",
            Self::F6 => "F6",
            Self::F7 => "F7",
            Self::F8 => "F8",
            Self::F9 => "F9",
            Self::F10 => "F10",
            Self::F11 => "F11",
            Self::F12 => "F12",
            Self::CapsLock => "Caps_Lock",
            Self::NumLock => "Num_Lock",
            Self::ScrollLock => "Scroll_Lock",
            Self::PrintScreen => "Print",
            Self::Pause => "Pause",
        }
    }

    /// Look up a physical hook key in the special-key table
    pub fn from_hook_key(key: Key) -> Option<Self> {
        let named = match key {
            Key::Escape => Self::Escape,
            Key::Return => Self::Enter,
            Key::Tab => Self::Tab,
            Key::Backspace => Self::Backspace,
            Key::Space => Self::Space,
            Key::ShiftLeft => Self::ShiftLeft,
            Key::ShiftRight => Self::ShiftRight,
            Key::ControlLeft => Self::ControlLeft,
            Key::ControlRight => Self::ControlRight,
            Key::Alt => Self::AltLeft,
            Key::AltGr => Self::AltRight,
            Key::MetaLeft => Self::SuperLeft,
            Key::MetaRight => Self::SuperRight,
            Key::UpArrow => Self::Up,
            Key::DownArrow => Self::Down,
            Key::LeftArrow => Self::Left,
            Key::RightArrow => Self::Right,
            Key::Insert => Self::Insert,
            Key::Delete => Self::Delete,
            Key::Home => Self::Home,
            Key::End => Self::End,
            Key::PageUp => Self::PageUp,
            Key::PageDown => Self::PageDown,
            Key::F1 => Self::F1,
            Key::F2 => Self::F2,
            Key::F3 => Self::F3,
            Key::F4 => Self::F4,
            Key::F5 => Self::F5,
            Key::F6 => Self::F6,
            Key::F7 => Self::F7,
            Key::F8 => Self::F8,
            Key::F9 => Self::F9,
            Key::F10 => Self::F10,
            Key::F11 => Self::F11,
            Key::F12 => Self::F12,
            Key::CapsLock => Self::CapsLock,
            Key::NumLock => Self::NumLock,
            Key::ScrollLock => Self::ScrollLock,
            Key::PrintScreen => Self::PrintScreen,
            Key::Pause => Self::Pause,
            Key::Unknown(code) if MENU_SCANCODES.contains(&code) => Self::Menu,
            _ => return None,
        };
        Some(named)
    }
}

/// Raw codes the hook reports for the context-menu key, which rdev has no
/// variant for.
#[cfg(target_os = "windows")]
const MENU_SCANCODES: &[u32] = &[0x5D];
#[cfg(target_os = "macos")]
const MENU_SCANCODES: &[u32] = &[110];
#[cfg(target_os = "linux")]
const MENU_SCANCODES: &[u32] = &[127, 135];
#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
const MENU_SCANCODES: &[u32] = &[];

/// Logical identity of one key, independent of shift/caps state.
///
/// Alphabetic characters are folded to lowercase so `A` and `a` share a
/// bucket. Other printable characters are kept as reported: shift+1 gives
/// `!`, not `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalKey {
    /// Printable key, by the character it produces
    Char(char),
    /// Key from the special-key table
    Named(NamedKey),
    /// Key the hook could not identify, by its raw code
    Scancode(u32),
    /// Key the hook knows but that has no table entry, by its raw name
    Other(&'static str),
}

impl CanonicalKey {
    pub const fn named(key: NamedKey) -> Self {
        Self::Named(key)
    }

    /// Canonical key for a printable character (alphabetic case folded)
    pub fn from_char(c: char) -> Self {
        Self::Char(fold_case(c))
    }
}

impl From<NamedKey> for CanonicalKey {
    fn from(key: NamedKey) -> Self {
        Self::Named(key)
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{}", c),
            Self::Named(key) => f.write_str(key.name()),
            Self::Scancode(code) => write!(f, "Unknown({})", code),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Fold alphabetic characters to lowercase; everything else is returned as is.
///
/// Characters whose lowercase form is more than one char are left alone.
pub fn fold_case(c: char) -> char {
    if !c.is_alphabetic() {
        return c;
    }
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Resolve a raw hook key to its canonical identity.
///
/// Pure and allocation-free; safe to call from the capture thread.
pub fn resolve(key: Key, text: Option<&str>) -> CanonicalKey {
    if let Some(named) = NamedKey::from_hook_key(key) {
        return CanonicalKey::Named(named);
    }
    if let Some(c) = text.and_then(printable_char) {
        return CanonicalKey::from_char(c);
    }
    if let Some(c) = physical_char(key) {
        return CanonicalKey::Char(c);
    }
    fallback(key)
}

/// Single printable, non-whitespace character in the reported text
fn printable_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() && !c.is_whitespace() => Some(c),
        _ => None,
    }
}

/// Character printed on the physical key in the US position, for hooks that
/// report no text (e.g. releases, or grab mode on Linux)
fn physical_char(key: Key) -> Option<char> {
    let c = match key {
        Key::BackQuote => '`',
        Key::Num1 => '1',
        Key::Num2 => '2',
        Key::Num3 => '3',
        Key::Num4 => '4',
        Key::Num5 => '5',
        Key::Num6 => '6',
        Key::Num7 => '7',
        Key::Num8 => '8',
        Key::Num9 => '9',
        Key::Num0 => '0',
        Key::Minus => '-',
        Key::Equal => '=',
        Key::KeyQ => 'q',
        Key::KeyW => 'w',
        Key::KeyE => 'e',
        Key::KeyR => 'r',
        Key::KeyT => 't',
        Key::KeyY => 'y',
        Key::KeyU => 'u',
        Key::KeyI => 'i',
        Key::KeyO => 'o',
        Key::KeyP => 'p',
        Key::LeftBracket => '[',
        Key::RightBracket => ']',
        Key::KeyA => 'a',
        Key::KeyS => 's',
        Key::KeyD => 'd',
        Key::KeyF => 'f',
        Key::KeyG => 'g',
        Key::KeyH => 'h',
        Key::KeyJ => 'j',
        Key::KeyK => 'k',
        Key::KeyL => 'l',
        Key::SemiColon => ';',
        Key::Quote => '\'',
        Key::BackSlash => '\\',
        Key::IntlBackslash => '<',
        Key::KeyZ => 'z',
        Key::KeyX => 'x',
        Key::KeyC => 'c',
        Key::KeyV => 'v',
        Key::KeyB => 'b',
        Key::KeyN => 'n',
        Key::KeyM => 'm',
        Key::Comma => ',',
        Key::Dot => '.',
        Key::Slash => '/',
        _ => return None,
    };
    Some(c)
}

/// Best-effort identity for keys outside every table
fn fallback(key: Key) -> CanonicalKey {
    let name = match key {
        Key::Unknown(code) => return CanonicalKey::Scancode(code),
        Key::KpReturn => "KpReturn",
        Key::KpMinus => "KpMinus",
        Key::KpPlus => "KpPlus",
        Key::KpMultiply => "KpMultiply",
        Key::KpDivide => "KpDivide",
        Key::KpDelete => "KpDelete",
        Key::Kp0 => "Kp0",
        Key::Kp1 => "Kp1",
        Key::Kp2 => "Kp2",
        Key::Kp3 => "Kp3",
        Key::Kp4 => "Kp4",
        Key::Kp5 => "Kp5",
        Key::Kp6 => "Kp6",
        Key::Kp7 => "Kp7",
        Key::Kp8 => "Kp8",
        Key::Kp9 => "Kp9",
        Key::Function => "Fn",
        _ => "Unnamed",
    };
    CanonicalKey::Other(name)
}
