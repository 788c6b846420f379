//! Polling keyboard listener for degraded mode
//!
//! Used when the low-level hook cannot be installed. It diffs the set of held
//! keys on every UI wake-up, so it needs no thread of its own, but it cannot
//! stop keys from reaching the operating system and its timestamps are only
//! as fine as the polling period.

use super::{resolve, CanonicalKey, KeyEvent, KeyEventType, LayoutId, SuppressionPolicy};
use device_query::{DeviceQuery, DeviceState, Keycode};
use rdev::Key;
use std::collections::VecDeque;
use std::time::Instant;

/// Keyboard listener that polls for key state changes
pub struct FallbackListener {
    device_state: DeviceState,
    diff: KeyDiff,
}

impl FallbackListener {
    /// Connect to the platform keyboard state, `None` if the display server
    /// (or accessibility permission) is unavailable.
    ///
    /// Polled keys carry no text, so characters come from the physical
    /// position on whichever layout `layout` has active.
    pub fn try_new(layout: SuppressionPolicy) -> Option<Self> {
        DeviceState::checked_new().map(|device_state| Self {
            device_state,
            diff: KeyDiff::new(layout),
        })
    }

    /// Sample the keyboard and append at most `max` events to `out`.
    /// Transitions beyond `max` wait for the next poll.
    pub fn poll(&mut self, max: usize, out: &mut Vec<KeyEvent>) -> usize {
        self.diff.update(self.device_state.get_keys(), Instant::now());
        self.diff.drain_into(max, out)
    }
}

/// Turns successive held-key snapshots into press and release events
struct KeyDiff {
    layout: SuppressionPolicy,
    /// Keys down at the last sample, with the identity resolved at press time
    held: Vec<(Keycode, CanonicalKey)>,
    pending: VecDeque<KeyEvent>,
}

impl KeyDiff {
    fn new(layout: SuppressionPolicy) -> Self {
        Self {
            layout,
            held: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    fn update(&mut self, current: Vec<Keycode>, now: Instant) {
        // Releases first so a key swapped for another within one poll
        // never looks like two keys held at once
        let pending = &mut self.pending;
        self.held.retain(|(code, key)| {
            let down = current.contains(code);
            if !down {
                pending.push_back(KeyEvent::new(*key, KeyEventType::Release, now));
            }
            down
        });

        let layout = self.layout.active();
        for code in current {
            if self.held.iter().any(|(held, _)| *held == code) {
                continue;
            }
            let key = resolve_polled(code, layout);
            self.held.push((code, key));
            self.pending.push_back(KeyEvent::new(key, KeyEventType::Press, now));
        }
    }

    fn drain_into(&mut self, max: usize, out: &mut Vec<KeyEvent>) -> usize {
        let count = max.min(self.pending.len());
        out.extend(self.pending.drain(..count));
        count
    }
}

/// Canonical key for a polled key code on `layout`
pub fn resolve_polled(keycode: Keycode, layout: LayoutId) -> CanonicalKey {
    let key = hook_key(keycode);
    match layout_char(key, layout) {
        Some(c) => {
            let mut buf = [0u8; 4];
            resolve(key, Some(c.encode_utf8(&mut buf)))
        }
        None => resolve(key, None),
    }
}

/// Character a physical key types on `layout`, where it differs from the
/// US position
fn layout_char(key: Key, layout: LayoutId) -> Option<char> {
    if layout != LayoutId::Azerty {
        return None;
    }
    let c = match key {
        Key::BackQuote => '²',
        Key::Num1 => '&',
        Key::Num2 => 'é',
        Key::Num3 => '"',
        Key::Num4 => '\'',
        Key::Num5 => '(',
        Key::Num6 => '-',
        Key::Num7 => 'è',
        Key::Num8 => '_',
        Key::Num9 => 'ç',
        Key::Num0 => 'à',
        Key::Minus => ')',
        Key::KeyQ => 'a',
        Key::KeyW => 'z',
        Key::LeftBracket => '^',
        Key::RightBracket => '$',
        Key::BackSlash => '*',
        Key::KeyA => 'q',
        Key::SemiColon => 'm',
        Key::Quote => 'ù',
        Key::KeyZ => 'w',
        Key::KeyM => ',',
        Key::Comma => ';',
        Key::Dot => ':',
        Key::Slash => '!',
        _ => return None,
    };
    Some(c)
}

/// Map a polled key code to the hook's physical key so both sources share
/// one resolver
pub fn hook_key(keycode: Keycode) -> Key {
    use device_query::Keycode as DK;
    match keycode {
        DK::Escape => Key::Escape,
        DK::Key1 => Key::Num1,
        DK::Key2 => Key::Num2,
        DK::Key3 => Key::Num3,
        DK::Key4 => Key::Num4,
        DK::Key5 => Key::Num5,
        DK::Key6 => Key::Num6,
        DK::Key7 => Key::Num7,
        DK::Key8 => Key::Num8,
        DK::Key9 => Key::Num9,
        DK::Key0 => Key::Num0,
        DK::Minus => Key::Minus,
        DK::Equal => Key::Equal,
        DK::Backspace => Key::Backspace,
        DK::Tab => Key::Tab,
        DK::Q => Key::KeyQ,
        DK::W => Key::KeyW,
        DK::E => Key::KeyE,
        DK::R => Key::KeyR,
        DK::T => Key::KeyT,
        DK::Y => Key::KeyY,
        DK::U => Key::KeyU,
        DK::I => Key::KeyI,
        DK::O => Key::KeyO,
        DK::P => Key::KeyP,
        DK::LeftBracket => Key::LeftBracket,
        DK::RightBracket => Key::RightBracket,
        DK::Enter => Key::Return,
        DK::LControl => Key::ControlLeft,
        DK::A => Key::KeyA,
        DK::S => Key::KeyS,
        DK::D => Key::KeyD,
        DK::F => Key::KeyF,
        DK::G => Key::KeyG,
        DK::H => Key::KeyH,
        DK::J => Key::KeyJ,
        DK::K => Key::KeyK,
        DK::L => Key::KeyL,
        DK::Semicolon => Key::SemiColon,
        DK::Apostrophe => Key::Quote,
        DK::Grave => Key::BackQuote,
        DK::LShift => Key::ShiftLeft,
        DK::BackSlash => Key::BackSlash,
        DK::Z => Key::KeyZ,
        DK::X => Key::KeyX,
        DK::C => Key::KeyC,
        DK::V => Key::KeyV,
        DK::B => Key::KeyB,
        DK::N => Key::KeyN,
        DK::M => Key::KeyM,
        DK::Comma => Key::Comma,
        DK::Dot => Key::Dot,
        DK::Slash => Key::Slash,
        DK::RShift => Key::ShiftRight,
        DK::LAlt => Key::Alt,
        DK::Space => Key::Space,
        DK::CapsLock => Key::CapsLock,
        DK::F1 => Key::F1,
        DK::F2 => Key::F2,
        DK::F3 => Key::F3,
        DK::F4 => Key::F4,
        DK::F5 => Key::F5,
        DK::F6 => Key::F6,
        DK::F7 => Key::F7,
        DK::F8 => Key::F8,
        DK::F9 => Key::F9,
        DK::F10 => Key::F10,
        DK::F11 => Key::F11,
        DK::F12 => Key::F12,
        DK::RControl => Key::ControlRight,
        DK::RAlt => Key::AltGr,
        DK::Home => Key::Home,
        DK::Up => Key::UpArrow,
        DK::PageUp => Key::PageUp,
        DK::Left => Key::LeftArrow,
        DK::Right => Key::RightArrow,
        DK::End => Key::End,
        DK::Down => Key::DownArrow,
        DK::PageDown => Key::PageDown,
        DK::Insert => Key::Insert,
        DK::Delete => Key::Delete,
        DK::LMeta => Key::MetaLeft,
        DK::RMeta => Key::MetaRight,
        DK::Numpad0 => Key::Kp0,
        DK::Numpad1 => Key::Kp1,
        DK::Numpad2 => Key::Kp2,
        DK::Numpad3 => Key::Kp3,
        DK::Numpad4 => Key::Kp4,
        DK::Numpad5 => Key::Kp5,
        DK::Numpad6 => Key::Kp6,
        DK::Numpad7 => Key::Kp7,
        DK::Numpad8 => Key::Kp8,
        DK::Numpad9 => Key::Kp9,
        DK::NumpadSubtract => Key::KpMinus,
        DK::NumpadAdd => Key::KpPlus,
        DK::NumpadDivide => Key::KpDivide,
        DK::NumpadMultiply => Key::KpMultiply,
        // Unmapped keys still get a stable, distinct fallback identity
        other => Key::Unknown(other as u32),
    }
}
