//! Capture thread
//!
//! Owns the OS keyboard hook. Every callback is handled synchronously:
//! stamp, resolve, decide, enqueue, then hand the decision back to the OS.
//! Nothing here waits on the UI thread.

use super::{CaptureError, EventProducer};
use crate::keyboard::{resolve, CanonicalKey, KeyEvent, KeyEventType, SuppressionPolicy};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, trace};
use rdev::Key;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Longest silence between a held key's press and its next auto-repeat.
/// A press for a held key after a longer gap is a new physical press whose
/// release the hook never saw.
pub const REPEAT_WINDOW: Duration = Duration::from_millis(2000);

/// A key the hook saw go down and not yet come up
#[derive(Debug, Clone, Copy)]
struct HeldKey {
    key: Key,
    /// Identity resolved at press time
    canonical: CanonicalKey,
    /// Press or latest auto-repeat
    last_seen: Instant,
}

/// Per-callback logic of the capture thread, independent of the OS hook
pub struct HookHandler {
    producer: EventProducer,
    policy: SuppressionPolicy,
    held: Vec<HeldKey>,
    running: Arc<AtomicBool>,
}

impl HookHandler {
    pub fn new(producer: EventProducer, policy: SuppressionPolicy, running: Arc<AtomicBool>) -> Self {
        Self {
            producer,
            policy,
            held: Vec::with_capacity(16),
            running,
        }
    }

    /// Handle one key transition reported by the hook.
    ///
    /// Returns true when the event must be kept from the operating system.
    pub fn handle(
        &mut self,
        kind: KeyEventType,
        key: Key,
        text: Option<&str>,
        timestamp: Instant,
    ) -> bool {
        if !self.running.load(Ordering::Relaxed) {
            return false;
        }

        let canonical = match kind {
            KeyEventType::Press => {
                if let Some(held) = self.repeat_of(key, timestamp) {
                    // Auto-repeat: not a physical transition
                    return self.policy.should_suppress(&held);
                }
                let canonical = resolve(key, text);
                self.hold(key, canonical, timestamp);
                canonical
            }
            // A release lands in the bucket its press was counted in, even if
            // the reported text changed (shift released first) or is missing
            KeyEventType::Release => self.release_held(key).unwrap_or_else(|| resolve(key, text)),
        };

        let suppress = self.policy.should_suppress(&canonical);
        trace!("{:?} {} (raw {:?}, text {:?}) suppress={}", kind, canonical, key, text, suppress);

        let event = KeyEvent::new(canonical, kind, timestamp).with_text(text.map(str::to_owned));
        if !self.producer.push(event) {
            trace!("Event consumer gone, dropping {}", canonical);
        }
        suppress
    }

    /// False once the session asked the capture thread to stop
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Identity of `key` if this press is an auto-repeat of a held key
    fn repeat_of(&mut self, key: Key, timestamp: Instant) -> Option<CanonicalKey> {
        let held = self.held.iter_mut().find(|h| h.key == key)?;
        if timestamp.saturating_duration_since(held.last_seen) > REPEAT_WINDOW {
            debug!("{} pressed again after a missed release", held.canonical);
            return None;
        }
        held.last_seen = timestamp;
        Some(held.canonical)
    }

    fn hold(&mut self, key: Key, canonical: CanonicalKey, timestamp: Instant) {
        let entry = HeldKey {
            key,
            canonical,
            last_seen: timestamp,
        };
        match self.held.iter_mut().find(|h| h.key == key) {
            Some(held) => *held = entry,
            None => self.held.push(entry),
        }
    }

    fn release_held(&mut self, key: Key) -> Option<CanonicalKey> {
        let index = self.held.iter().position(|h| h.key == key)?;
        Some(self.held.swap_remove(index).canonical)
    }
}

/// Install the rdev grab hook on the current thread and run it.
///
/// Blocks for as long as the hook is installed; returns only on failure.
pub fn rdev_installer(handler: HookHandler) -> Result<(), CaptureError> {
    let handler = std::cell::RefCell::new(handler);

    rdev::grab(move |event: rdev::Event| {
        let timestamp = Instant::now();
        let (kind, key) = match event.event_type {
            rdev::EventType::KeyPress(key) => (KeyEventType::Press, key),
            rdev::EventType::KeyRelease(key) => (KeyEventType::Release, key),
            _ => return Some(event),
        };

        let suppress = match handler.try_borrow_mut() {
            Ok(mut handler) => handler.handle(kind, key, event.name.as_deref(), timestamp),
            // Re-entrant callback; let the event through untouched
            Err(_) => false,
        };

        if suppress {
            None
        } else {
            Some(event)
        }
    })
    .map_err(|e| CaptureError::HookInstall(format!("{:?}", e)))
}

/// Handle to the running capture thread
pub struct HookThread {
    handle: JoinHandle<()>,
    running: Arc<AtomicBool>,
    status: Receiver<CaptureError>,
}

impl HookThread {
    /// Spawn the capture thread and run `install` on it
    pub fn spawn<I>(handler: HookHandler, install: I) -> Result<Self, CaptureError>
    where
        I: FnOnce(HookHandler) -> Result<(), CaptureError> + Send + 'static,
    {
        let running = Arc::clone(&handler.running);
        let thread_running = Arc::clone(&running);
        let (status_tx, status) = crossbeam_channel::bounded(1);

        let handle = thread::Builder::new()
            .name("key-capture".to_string())
            .spawn(move || {
                let failure = match install(handler) {
                    Err(e) => Some(e),
                    Ok(()) if thread_running.load(Ordering::Relaxed) => Some(CaptureError::HookExited),
                    Ok(()) => None,
                };
                if let Some(e) = failure {
                    let _ = status_tx.send(e);
                }
            })
            .map_err(CaptureError::Spawn)?;

        Ok(Self {
            handle,
            running,
            status,
        })
    }

    /// Wait up to `probe` for an installation failure. Silence means the
    /// hook is live.
    pub fn wait_ready(&self, probe: Duration) -> Result<(), CaptureError> {
        match self.status.recv_timeout(probe) {
            Ok(e) => Err(e),
            Err(RecvTimeoutError::Timeout) => Ok(()),
            // Thread ended without a report: it was told to stop
            Err(RecvTimeoutError::Disconnected) => Err(CaptureError::HookExited),
        }
    }

    /// A failure reported since the last check, without waiting
    pub fn try_failure(&self) -> Option<CaptureError> {
        self.status.try_recv().ok()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop producing and join the thread, waiting at most `timeout`.
    ///
    /// Returns false if the thread had to be detached.
    pub fn shutdown(self, timeout: Duration) -> bool {
        self.running.store(false, Ordering::Relaxed);

        let deadline = Instant::now() + timeout;
        while !self.handle.is_finished() {
            if Instant::now() >= deadline {
                // The OS hook has no stop call; the thread now passes every
                // event through and dies with the process
                debug!("Capture thread still in hook after {:?}, detaching", timeout);
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        let _ = self.handle.join();
        true
    }
}
