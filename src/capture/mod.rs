//! Key capture: OS hook thread, event queue and session

mod channel;
mod hook;
mod session;

pub use channel::{event_channel, EventConsumer, EventProducer, DEFAULT_MAX_BACKLOG};
pub use hook::{rdev_installer, HookHandler, HookThread};
pub use session::{CaptureMode, CaptureSession};

use thiserror::Error;

/// Capture errors. None of them are fatal: the session degrades instead.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("hook installation failed: {0}")]
    HookInstall(String),
    #[error("hook exited unexpectedly")]
    HookExited,
    #[error("could not spawn capture thread: {0}")]
    Spawn(#[source] std::io::Error),
}
