//! Keyboard event types

use super::CanonicalKey;
use std::time::{Duration, Instant};

/// Type of keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventType {
    /// Key was pressed down
    Press,
    /// Key was released
    Release,
}

/// One physical key transition, stamped where it was captured
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    /// Canonical key identity
    pub key: CanonicalKey,
    /// Type of event (press/release)
    pub event_type: KeyEventType,
    /// When the event was captured
    pub timestamp: Instant,
    /// Text the input source reported for the key, if any
    pub text: Option<String>,
}

impl KeyEvent {
    pub fn new(key: CanonicalKey, event_type: KeyEventType, timestamp: Instant) -> Self {
        Self {
            key,
            event_type,
            timestamp,
            text: None,
        }
    }

    pub fn press(key: CanonicalKey, timestamp: Instant) -> Self {
        Self::new(key, KeyEventType::Press, timestamp)
    }

    pub fn release(key: CanonicalKey, timestamp: Instant) -> Self {
        Self::new(key, KeyEventType::Release, timestamp)
    }

    /// Attach the text the input source reported
    pub fn with_text(mut self, text: Option<String>) -> Self {
        self.text = text;
        self
    }

    pub fn is_press(&self) -> bool {
        self.event_type == KeyEventType::Press
    }

    /// Time elapsed from `earlier` to this event, zero if `earlier` is later
    pub fn since(&self, earlier: Instant) -> Duration {
        self.timestamp.saturating_duration_since(earlier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_event_type() {
        let now = Instant::now();
        let press = KeyEvent::press(CanonicalKey::Char('a'), now);
        let release = KeyEvent::release(CanonicalKey::Char('a'), now);
        assert!(press.is_press());
        assert!(!release.is_press());
        assert_eq!(release.event_type, KeyEventType::Release);
        assert!(press.text.is_none());
    }

    #[test]
    fn since_saturates_for_out_of_order_timestamps() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(5);
        let event = KeyEvent::release(CanonicalKey::Char('a'), t0);
        assert_eq!(event.since(t1), Duration::ZERO);
        let event = KeyEvent::release(CanonicalKey::Char('a'), t1);
        assert_eq!(event.since(t0), Duration::from_millis(5));
    }

    #[test]
    fn with_text_keeps_reported_form() {
        let event = KeyEvent::press(CanonicalKey::Char('a'), Instant::now())
            .with_text(Some("A".to_string()));
        assert_eq!(event.text.as_deref(), Some("A"));
        assert_eq!(event.key, CanonicalKey::Char('a'));
    }
}
