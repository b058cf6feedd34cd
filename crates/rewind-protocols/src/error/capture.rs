//! Capture-side errors. Always swallowed locally, never surfaced to the
//! monitored page.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Session is closed: {0}")]
    SessionClosed(String),

    #[error("Session limit reached: {0}")]
    SessionLimit(String),

    #[error("Frame not registered: {0}")]
    FrameNotRegistered(String),

    #[error("Hook installation failed: {0}")]
    HookInstall(String),

    #[error("Instrumentation fault: {0}")]
    Instrumentation(String),

    #[error("Event channel closed")]
    ChannelClosed,
}
