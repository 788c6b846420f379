//! Keyboard state tracking

use super::{CanonicalKey, KeyEvent, KeyEventType, LayoutTable};
use std::collections::HashMap;

/// How a key is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyVisualState {
    /// Never released since start or last reset
    #[default]
    Default,
    /// Currently held down
    Active,
    /// Released at least once since start or last reset
    Tested,
}

/// Per-key visual state, keyed by canonical key rather than by layout so
/// switching layouts never loses it
#[derive(Debug, Default)]
pub struct KeyboardState {
    keys: HashMap<CanonicalKey, KeyVisualState>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a key event and return the key's new visual state.
    ///
    /// A release marks the key Tested whether or not its press was seen.
    pub fn process_event(&mut self, event: &KeyEvent) -> KeyVisualState {
        let visual = match event.event_type {
            KeyEventType::Press => KeyVisualState::Active,
            KeyEventType::Release => KeyVisualState::Tested,
        };
        self.keys.insert(event.key, visual);
        visual
    }

    pub fn state_of(&self, key: &CanonicalKey) -> KeyVisualState {
        self.keys.get(key).copied().unwrap_or_default()
    }

    /// Keys marked Tested, across all layouts
    pub fn tested_count(&self) -> usize {
        self.keys
            .values()
            .filter(|v| **v == KeyVisualState::Tested)
            .count()
    }

    /// Keys of `table` marked Tested
    pub fn tested_count_in(&self, table: &LayoutTable) -> usize {
        table
            .keys()
            .filter(|cap| self.state_of(&cap.key) == KeyVisualState::Tested)
            .count()
    }

    /// Every key back to Default
    pub fn reset(&mut self) {
        self.keys.clear();
    }
}
