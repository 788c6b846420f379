//! Capture session
//!
//! The single owner of whatever is producing key events: the hook thread
//! with its queue, or the polling listener when the hook is unavailable.
//! Constructed at startup by the top-level controller and torn down
//! explicitly at shutdown.

use super::hook::{rdev_installer, HookHandler, HookThread};
use super::{event_channel, CaptureError, EventConsumer};
use crate::config::CaptureConfig;
use crate::keyboard::{FallbackListener, KeyEvent, SuppressionPolicy};
use log::{info, warn};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Where key events currently come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// OS hook, swallowing layout keys
    HookSuppress,
    /// OS hook, every key reaches the system
    Hook,
    /// Polled key state, no suppression
    Fallback,
    /// Terminal key events only
    Terminal,
}

impl CaptureMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::HookSuppress => "HOOK+SUPPRESS",
            Self::Hook => "HOOK",
            Self::Fallback => "FALLBACK",
            Self::Terminal => "TERMINAL",
        }
    }

    pub fn suppression_available(&self) -> bool {
        *self == Self::HookSuppress
    }
}

enum CaptureSource {
    Hook {
        thread: HookThread,
        consumer: EventConsumer,
        /// Handed to the polling listener if the hook dies
        policy: SuppressionPolicy,
    },
    Fallback(FallbackListener),
    Terminal,
}

/// Live capture session
pub struct CaptureSession {
    source: CaptureSource,
    suppress: bool,
    /// Consumer of a hook that died, kept until its queue is empty
    orphaned: Option<EventConsumer>,
    dropped_before: u64,
    notice: Option<String>,
}

impl CaptureSession {
    /// Start capturing with the OS hook, falling back to polling
    pub fn start(config: &CaptureConfig, policy: SuppressionPolicy) -> Self {
        if !config.hook {
            info!("Keyboard hook disabled by configuration");
            return Self::degraded(
                "keyboard hook disabled".to_string(),
                FallbackListener::try_new(policy),
            );
        }
        Self::start_with(config, policy, rdev_installer)
    }

    /// Start capturing with a custom hook installer.
    ///
    /// `install` runs on the capture thread and must block for as long as
    /// the hook is installed.
    pub fn start_with<I>(config: &CaptureConfig, policy: SuppressionPolicy, install: I) -> Self
    where
        I: FnOnce(HookHandler) -> Result<(), CaptureError> + Send + 'static,
    {
        let (producer, consumer) = event_channel();
        let consumer = consumer.with_max_backlog(config.max_backlog);
        let running = Arc::new(AtomicBool::new(true));
        let suppress = policy.is_enabled();
        let handler = HookHandler::new(producer, policy.clone(), running);

        let failure = match HookThread::spawn(handler, install) {
            Ok(thread) => match thread.wait_ready(config.startup_probe()) {
                Ok(()) => {
                    info!(
                        "Keyboard hook installed (suppression {})",
                        if suppress { "on" } else { "off" }
                    );
                    return Self {
                        source: CaptureSource::Hook {
                            thread,
                            consumer,
                            policy,
                        },
                        suppress,
                        orphaned: None,
                        dropped_before: 0,
                        notice: None,
                    };
                }
                Err(e) => {
                    thread.shutdown(config.shutdown_timeout());
                    e
                }
            },
            Err(e) => e,
        };

        warn!("Keyboard hook unavailable: {}", failure);
        Self::degraded(failure.to_string(), FallbackListener::try_new(policy))
    }

    /// Session without the hook
    pub fn degraded(reason: String, listener: Option<FallbackListener>) -> Self {
        let source = match listener {
            Some(listener) => CaptureSource::Fallback(listener),
            None => {
                warn!("Keyboard state polling unavailable, using terminal key events");
                CaptureSource::Terminal
            }
        };
        let mut session = Self {
            source,
            suppress: false,
            orphaned: None,
            dropped_before: 0,
            notice: None,
        };
        session.notice = Some(session.degraded_notice(&reason));
        session
    }

    fn degraded_notice(&self, reason: &str) -> String {
        let source = match self.source {
            CaptureSource::Fallback(_) => "polling key state",
            _ => "terminal key events only",
        };
        format!("Key suppression unavailable ({}): {}", reason, source)
    }

    pub fn mode(&self) -> CaptureMode {
        match self.source {
            CaptureSource::Hook { .. } if self.suppress => CaptureMode::HookSuppress,
            CaptureSource::Hook { .. } => CaptureMode::Hook,
            CaptureSource::Fallback(_) => CaptureMode::Fallback,
            CaptureSource::Terminal => CaptureMode::Terminal,
        }
    }

    pub fn suppression_available(&self) -> bool {
        self.mode().suppression_available()
    }

    /// One-time message for the operator, if there is one
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Collect up to `max` events in capture order. Returns the number
    /// collected.
    pub fn poll(&mut self, max: usize, out: &mut Vec<KeyEvent>) -> usize {
        let mut moved = 0;
        if let Some(consumer) = self.orphaned.as_mut() {
            moved += consumer.drain_into(max, out);
            if consumer.is_disconnected() {
                self.dropped_before += consumer.dropped();
                self.orphaned = None;
            }
        }

        moved += match &mut self.source {
            CaptureSource::Hook { consumer, .. } => consumer.drain_into(max - moved, out),
            CaptureSource::Fallback(listener) => listener.poll(max - moved, out),
            CaptureSource::Terminal => 0,
        };

        self.check_hook();
        moved
    }

    /// Switch to degraded mode if the hook thread reported a failure
    fn check_hook(&mut self) {
        let failure = match &self.source {
            CaptureSource::Hook { thread, .. } => thread.try_failure(),
            _ => None,
        };
        let Some(failure) = failure else {
            return;
        };

        warn!("Keyboard hook stopped: {}", failure);
        let previous = std::mem::replace(&mut self.source, CaptureSource::Terminal);
        let listener = match previous {
            CaptureSource::Hook {
                thread,
                consumer,
                policy,
            } => {
                thread.shutdown(Duration::ZERO);
                self.orphaned = Some(consumer);
                FallbackListener::try_new(policy)
            }
            _ => None,
        };
        let degraded = Self::degraded(failure.to_string(), listener);
        self.source = degraded.source;
        self.suppress = false;
        self.notice = degraded.notice;
    }

    /// Events waiting in the hook queue
    pub fn backlog(&self) -> usize {
        let live = match &self.source {
            CaptureSource::Hook { consumer, .. } => consumer.backlog(),
            _ => 0,
        };
        live + self.orphaned.as_ref().map_or(0, |c| c.backlog())
    }

    /// Events discarded because the queue overflowed
    pub fn dropped(&self) -> u64 {
        let live = match &self.source {
            CaptureSource::Hook { consumer, .. } => consumer.dropped(),
            _ => 0,
        };
        self.dropped_before + live + self.orphaned.as_ref().map_or(0, |c| c.dropped())
    }

    /// Stop producing, discard what is still queued and release the hook.
    ///
    /// Never waits longer than `timeout` for the capture thread.
    pub fn shutdown(self, timeout: Duration) {
        match self.source {
            CaptureSource::Hook { thread, consumer, .. } => {
                let pending = consumer.backlog();
                if thread.shutdown(timeout) {
                    info!("Capture thread stopped ({} queued events discarded)", pending);
                } else {
                    warn!("Capture thread did not stop within {:?}, detached", timeout);
                }
            }
            CaptureSource::Fallback(_) | CaptureSource::Terminal => {
                info!("Capture session closed");
            }
        }
    }
}
