//! Suppression policy
//!
//! Decides, inside the hook callback, whether a key event is kept from the
//! operating system. Key sets are built once and shared read-only; the only
//! mutable part is the active-layout selector, a single atomic the UI thread
//! writes on layout switch.

use super::{CanonicalKey, LayoutId, NamedKey};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Keys suppressed on every layout because the host reacts to them
/// (start menu, screenshot tool, focus changes)
pub const ALWAYS_SUPPRESSED: [NamedKey; 4] = [
    NamedKey::SuperLeft,
    NamedKey::SuperRight,
    NamedKey::PrintScreen,
    NamedKey::Escape,
];

/// Cheap to clone; clones share the active-layout selector
#[derive(Debug, Clone)]
pub struct SuppressionPolicy {
    /// Key set per layout, indexed by `LayoutId::index`
    layouts: Arc<[HashSet<CanonicalKey>]>,
    always: Arc<HashSet<CanonicalKey>>,
    active: Arc<AtomicUsize>,
    enabled: bool,
}

impl SuppressionPolicy {
    pub fn new(active: LayoutId, enabled: bool) -> Self {
        let layouts: Vec<HashSet<CanonicalKey>> = LayoutId::all()
            .iter()
            .map(|id| id.table().key_set())
            .collect();
        let always = ALWAYS_SUPPRESSED.iter().map(|k| CanonicalKey::Named(*k)).collect();

        Self {
            layouts: layouts.into(),
            always: Arc::new(always),
            active: Arc::new(AtomicUsize::new(active.index())),
            enabled,
        }
    }

    /// Whether the event for `key` must be kept from the operating system
    pub fn should_suppress(&self, key: &CanonicalKey) -> bool {
        if !self.enabled {
            return false;
        }
        if self.always.contains(key) {
            return true;
        }
        let active = self.active.load(Ordering::Relaxed);
        self.layouts
            .get(active)
            .map(|set| set.contains(key))
            .unwrap_or(false)
    }

    pub fn is_always_suppressed(&self, key: &CanonicalKey) -> bool {
        self.always.contains(key)
    }

    pub fn set_active(&self, layout: LayoutId) {
        self.active.store(layout.index(), Ordering::Relaxed);
    }

    pub fn active(&self) -> LayoutId {
        LayoutId::from_index(self.active.load(Ordering::Relaxed))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for SuppressionPolicy {
    fn default() -> Self {
        Self::new(LayoutId::default(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn active_layout_keys_are_suppressed() {
        let policy = SuppressionPolicy::new(LayoutId::Qwerty, true);
        assert!(policy.should_suppress(&CanonicalKey::Char('a')));
        assert!(policy.should_suppress(&CanonicalKey::Named(NamedKey::F1)));
        assert!(!policy.should_suppress(&CanonicalKey::Char('é')));
    }

    #[test]
    fn switching_layout_changes_the_set() {
        let policy = SuppressionPolicy::new(LayoutId::Qwerty, true);
        policy.set_active(LayoutId::Azerty);
        assert_eq!(policy.active(), LayoutId::Azerty);
        assert!(policy.should_suppress(&CanonicalKey::Char('é')));
        assert!(!policy.should_suppress(&CanonicalKey::Named(NamedKey::F1)));
    }

    #[test]
    fn always_suppressed_keys_on_every_layout() {
        let policy = SuppressionPolicy::new(LayoutId::Azerty, true);
        // Escape and Print are not on the AZERTY table
        for key in ALWAYS_SUPPRESSED {
            assert!(policy.should_suppress(&CanonicalKey::Named(key)), "{:?}", key);
            assert!(policy.is_always_suppressed(&CanonicalKey::Named(key)));
        }
    }

    #[test]
    fn unknown_keys_pass_through() {
        let policy = SuppressionPolicy::default();
        assert!(!policy.should_suppress(&CanonicalKey::Scancode(9999)));
        assert!(!policy.should_suppress(&CanonicalKey::Other("KpReturn")));
    }

    #[test]
    fn disabled_policy_suppresses_nothing() {
        let policy = SuppressionPolicy::new(LayoutId::Qwerty, false);
        assert!(!policy.is_enabled());
        assert!(!policy.should_suppress(&CanonicalKey::Char('a')));
        assert!(!policy.should_suppress(&CanonicalKey::Named(NamedKey::Escape)));
    }

    #[test]
    fn clones_share_the_selector_across_threads() {
        let policy = SuppressionPolicy::new(LayoutId::Qwerty, true);
        let capture_side = policy.clone();
        policy.set_active(LayoutId::Azerty);

        let seen = thread::spawn(move || {
            (
                capture_side.active(),
                capture_side.should_suppress(&CanonicalKey::Char('ù')),
            )
        })
        .join()
        .unwrap();
        assert_eq!(seen, (LayoutId::Azerty, true));
    }
}
