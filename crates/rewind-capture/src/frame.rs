//! The seam between the engine and a live content frame.
//!
//! A [`ContentFrame`] is whatever the embedding shell gives us for one
//! monitored document: in production an engine-level instrumentation handle
//! (devtools-protocol hooks), in tests a scripted fake. The contract for
//! hook installation is strict: wrapping navigation/network primitives is
//! observation only - original call-through semantics are preserved exactly,
//! and teardown restores every wrapped global.

use std::sync::Arc;

use async_trait::async_trait;

use rewind_protocols::{CaptureError, FrameId, PageContext, RawEvent};

/// Receives low-level DOM and synthetic instrumentation events from a frame.
///
/// Implemented by [`CaptureAgent`](crate::CaptureAgent). The frame invokes
/// this synchronously from its event hot path, so implementations must not
/// block or perform heavy work.
pub trait DomEventHandler: Send + Sync {
    fn on_dom_event(&self, event: RawEvent);
}

/// One monitored content document.
#[async_trait]
pub trait ContentFrame: Send + Sync {
    fn id(&self) -> FrameId;

    /// Install capturing listeners for the fixed event set and wrap the
    /// history/fetch primitives so synthetic navigation/network events flow
    /// to `handler`. Installing twice is a frame-side error; the agent
    /// guards with its own installed flag.
    async fn install_hooks(&self, handler: Arc<dyn DomEventHandler>) -> Result<(), CaptureError>;

    /// Symmetric teardown: remove listeners, restore wrapped globals,
    /// disconnect observers.
    async fn remove_hooks(&self) -> Result<(), CaptureError>;

    /// Current url/title/viewport/landmarks of the document.
    async fn page_context(&self) -> PageContext;

    /// Heuristic count of result-like items currently on the page, used by
    /// the result-surface probe. `None` when no result surface is present.
    async fn result_surface_count(&self) -> Option<u32>;
}
