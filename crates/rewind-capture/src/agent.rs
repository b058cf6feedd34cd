//! Per-frame capture agent.
//!
//! One agent exists per content frame per document load; navigation tears
//! the old one down and installs a fresh one. The agent filters out
//! untrusted (synthetic) events, with an explicit allow-list for
//! asynchronous media events, and forwards everything else across the
//! frame-to-host channel. Errors on this path are logged and swallowed -
//! nothing the agent does may propagate into the page's own scripts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use rewind_protocols::{CaptureError, EventSink, FrameId, RawEvent, RawEventKind};

use crate::frame::{ContentFrame, DomEventHandler};

/// In-frame instrumentation observing trusted browser events.
pub struct CaptureAgent {
    frame: Arc<dyn ContentFrame>,
    sink: EventSink,
    installed: AtomicBool,
}

impl CaptureAgent {
    pub fn new(frame: Arc<dyn ContentFrame>, sink: EventSink) -> Self {
        Self {
            frame,
            sink,
            installed: AtomicBool::new(false),
        }
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame.id()
    }

    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    /// Install hooks into the frame. Idempotent: a second call while
    /// installed is a no-op, so re-installation after navigation is safe to
    /// drive unconditionally.
    pub async fn install(self: &Arc<Self>) -> Result<(), CaptureError> {
        if self.installed.swap(true, Ordering::SeqCst) {
            debug!(frame = %self.frame.id(), "capture agent already installed");
            return Ok(());
        }
        let handler: Arc<dyn DomEventHandler> = self.clone();
        if let Err(e) = self.frame.install_hooks(handler).await {
            self.installed.store(false, Ordering::SeqCst);
            return Err(e);
        }
        debug!(frame = %self.frame.id(), "capture agent installed");
        Ok(())
    }

    /// Symmetric teardown. Restores every wrapped global and disconnects
    /// observers. A teardown without a prior install is a no-op.
    pub async fn teardown(&self) -> Result<(), CaptureError> {
        if !self.installed.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.frame.remove_hooks().await?;
        debug!(frame = %self.frame.id(), "capture agent removed");
        Ok(())
    }

    /// Untrusted events are dropped except for the asynchronous media
    /// events, which fire without `isTrusted` even for user-initiated
    /// playback.
    fn accepts(&self, event: &RawEvent) -> bool {
        event.trusted
            || matches!(
                event.kind,
                RawEventKind::MediaPlay
                    | RawEventKind::MediaPause
                    | RawEventKind::HistoryPushState
                    | RawEventKind::HistoryReplaceState
                    | RawEventKind::FetchCompleted { .. }
                    | RawEventKind::MutationBatch { .. }
                    | RawEventKind::PageLoad
            )
    }
}

impl DomEventHandler for CaptureAgent {
    fn on_dom_event(&self, event: RawEvent) {
        if !self.installed.load(Ordering::SeqCst) {
            return;
        }
        if !self.accepts(&event) {
            debug!(frame = %event.frame, kind = ?event.kind, "dropping untrusted event");
            return;
        }
        if !self.sink.emit(event) {
            // Host gone or backpressured. Either way the event is dropped
            // here rather than blocking the frame's event path.
            warn!(frame = %self.frame.id(), "event channel unavailable, event dropped");
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
