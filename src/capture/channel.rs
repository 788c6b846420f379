//! Capture thread -> UI thread event queue
//!
//! One producer, one consumer, FIFO. Neither half is `Clone`, so a second
//! producer or consumer cannot be created by accident. The producer only
//! ever sends; backlog control happens on the consumer side so the hook
//! callback never waits.

use crate::keyboard::KeyEvent;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use log::warn;

/// Default cap on queued events before the oldest are discarded
pub const DEFAULT_MAX_BACKLOG: usize = 65_536;

/// Create a connected producer/consumer pair
pub fn event_channel() -> (EventProducer, EventConsumer) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (
        EventProducer { tx },
        EventConsumer {
            rx,
            max_backlog: DEFAULT_MAX_BACKLOG,
            dropped: 0,
            disconnected: false,
        },
    )
}

/// Sending half, owned by the capture thread
#[derive(Debug)]
pub struct EventProducer {
    tx: Sender<KeyEvent>,
}

impl EventProducer {
    /// Enqueue an event without blocking. Returns false once the consumer
    /// is gone.
    pub fn push(&self, event: KeyEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Receiving half, owned by the UI loop
#[derive(Debug)]
pub struct EventConsumer {
    rx: Receiver<KeyEvent>,
    max_backlog: usize,
    dropped: u64,
    disconnected: bool,
}

impl EventConsumer {
    /// Cap the number of queued events; 0 disables the cap
    pub fn with_max_backlog(mut self, max_backlog: usize) -> Self {
        self.max_backlog = max_backlog;
        self
    }

    /// Move up to `max` events, oldest first, into `out`.
    /// Returns the number of events moved.
    pub fn drain_into(&mut self, max: usize, out: &mut Vec<KeyEvent>) -> usize {
        self.shed_backlog();

        let mut moved = 0;
        while moved < max {
            match self.rx.try_recv() {
                Ok(event) => {
                    out.push(event);
                    moved += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        moved
    }

    /// Events waiting to be drained
    pub fn backlog(&self) -> usize {
        self.rx.len()
    }

    /// Events discarded because the backlog overflowed
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// True once the producer is gone and the queue has run dry
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    /// Discard the oldest events beyond the backlog cap
    fn shed_backlog(&mut self) {
        if self.max_backlog == 0 {
            return;
        }
        let excess = self.rx.len().saturating_sub(self.max_backlog);
        if excess == 0 {
            return;
        }

        let mut shed = 0u64;
        for _ in 0..excess {
            if self.rx.try_recv().is_err() {
                break;
            }
            shed += 1;
        }
        self.dropped += shed;
        warn!(
            "Event backlog exceeded {} events: dropped {} oldest ({} total)",
            self.max_backlog, shed, self.dropped
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{CanonicalKey, KeyEventType};
    use proptest::prelude::*;
    use std::thread;
    use std::time::Instant;

    fn event(code: u32, event_type: KeyEventType) -> KeyEvent {
        KeyEvent::new(CanonicalKey::Scancode(code), event_type, Instant::now())
    }

    fn codes(events: &[KeyEvent]) -> Vec<CanonicalKey> {
        events.iter().map(|e| e.key).collect()
    }

    #[test]
    fn drains_in_fifo_order() {
        let (producer, mut consumer) = event_channel();
        for code in 0..5 {
            assert!(producer.push(event(code, KeyEventType::Press)));
        }
        let mut out = Vec::new();
        assert_eq!(consumer.drain_into(usize::MAX, &mut out), 5);
        assert_eq!(codes(&out), (0..5).map(CanonicalKey::Scancode).collect::<Vec<_>>());
    }

    #[test]
    fn drain_respects_batch_size() {
        let (producer, mut consumer) = event_channel();
        for code in 0..10 {
            producer.push(event(code, KeyEventType::Press));
        }
        let mut out = Vec::new();
        assert_eq!(consumer.drain_into(4, &mut out), 4);
        assert_eq!(consumer.backlog(), 6);
        assert_eq!(consumer.drain_into(4, &mut out), 4);
        assert_eq!(consumer.drain_into(4, &mut out), 2);
        assert_eq!(codes(&out), (0..10).map(CanonicalKey::Scancode).collect::<Vec<_>>());
    }

    #[test]
    fn overflow_drops_oldest_and_counts() {
        let (producer, consumer) = event_channel();
        let mut consumer = consumer.with_max_backlog(3);
        for code in 0..8 {
            producer.push(event(code, KeyEventType::Press));
        }
        let mut out = Vec::new();
        consumer.drain_into(usize::MAX, &mut out);
        assert_eq!(consumer.dropped(), 5);
        assert_eq!(codes(&out), (5..8).map(CanonicalKey::Scancode).collect::<Vec<_>>());
    }

    #[test]
    fn zero_backlog_cap_keeps_everything() {
        let (producer, consumer) = event_channel();
        let mut consumer = consumer.with_max_backlog(0);
        for code in 0..100 {
            producer.push(event(code, KeyEventType::Release));
        }
        let mut out = Vec::new();
        assert_eq!(consumer.drain_into(usize::MAX, &mut out), 100);
        assert_eq!(consumer.dropped(), 0);
    }

    #[test]
    fn disconnect_is_reported_after_queue_runs_dry() {
        let (producer, mut consumer) = event_channel();
        producer.push(event(1, KeyEventType::Press));
        drop(producer);

        let mut out = Vec::new();
        consumer.drain_into(1, &mut out);
        assert!(!consumer.is_disconnected());
        consumer.drain_into(1, &mut out);
        assert!(consumer.is_disconnected());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn push_fails_once_consumer_is_gone() {
        let (producer, consumer) = event_channel();
        drop(consumer);
        assert!(!producer.push(event(1, KeyEventType::Press)));
    }

    proptest! {
        #[test]
        fn order_is_preserved_across_threads(
            script in prop::collection::vec((0u32..16, any::<bool>()), 0..400),
            batch in 1usize..64,
        ) {
            let expected: Vec<(CanonicalKey, KeyEventType)> = script
                .iter()
                .map(|(code, press)| {
                    let kind = if *press { KeyEventType::Press } else { KeyEventType::Release };
                    (CanonicalKey::Scancode(*code), kind)
                })
                .collect();

            let (producer, mut consumer) = event_channel();
            let to_send = expected.clone();
            let handle = thread::spawn(move || {
                for (key, kind) in to_send {
                    producer.push(KeyEvent::new(key, kind, Instant::now()));
                }
            });

            let mut out = Vec::new();
            while !consumer.is_disconnected() {
                consumer.drain_into(batch, &mut out);
                thread::yield_now();
            }
            handle.join().unwrap();

            let observed: Vec<_> = out.iter().map(|e| (e.key, e.event_type)).collect();
            prop_assert_eq!(observed, expected);
            prop_assert_eq!(consumer.dropped(), 0);
        }
    }
}
