//! Shared test doubles for capture tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use rewind_protocols::{
    CaptureError, ElementSnapshot, FrameId, PageContext, RawEvent, RawEventKind, Rect,
};

use crate::frame::{ContentFrame, DomEventHandler};

/// A scripted frame: records hook installs/removals and lets tests fire
/// events through the installed handler as the page would.
pub struct ScriptedFrame {
    id: FrameId,
    pub handler: Mutex<Option<Arc<dyn DomEventHandler>>>,
    pub installs: AtomicU32,
    pub removals: AtomicU32,
    pub context: Mutex<PageContext>,
    pub result_count: Mutex<Option<u32>>,
}

impl ScriptedFrame {
    pub fn new(id: &str, url: &str) -> Self {
        Self {
            id: FrameId::new(id),
            handler: Mutex::new(None),
            installs: AtomicU32::new(0),
            removals: AtomicU32::new(0),
            context: Mutex::new(PageContext {
                url: url.to_string(),
                title: "Scripted".to_string(),
                viewport: (1280, 800),
                landmarks: vec![],
            }),
            result_count: Mutex::new(None),
        }
    }

    /// Deliver an event through the installed handler, as the frame's own
    /// instrumentation would.
    pub fn fire(&self, event: RawEvent) {
        let handler = self.handler.lock().clone();
        if let Some(handler) = handler {
            handler.on_dom_event(event);
        }
    }

    pub fn set_url(&self, url: &str) {
        self.context.lock().url = url.to_string();
    }
}

#[async_trait]
impl ContentFrame for ScriptedFrame {
    fn id(&self) -> FrameId {
        self.id.clone()
    }

    async fn install_hooks(&self, handler: Arc<dyn DomEventHandler>) -> Result<(), CaptureError> {
        self.installs.fetch_add(1, Ordering::SeqCst);
        *self.handler.lock() = Some(handler);
        Ok(())
    }

    async fn remove_hooks(&self) -> Result<(), CaptureError> {
        self.removals.fetch_add(1, Ordering::SeqCst);
        *self.handler.lock() = None;
        Ok(())
    }

    async fn page_context(&self) -> PageContext {
        self.context.lock().clone()
    }

    async fn result_surface_count(&self) -> Option<u32> {
        *self.result_count.lock()
    }
}

/// A visible button snapshot with an id.
pub fn button_snapshot(id: &str, text: &str) -> ElementSnapshot {
    ElementSnapshot {
        tag: "button".to_string(),
        id: Some(id.to_string()),
        text: Some(text.to_string()),
        rect: Rect::new(10.0, 10.0, 120.0, 32.0),
        opacity: 1.0,
        ..Default::default()
    }
}

/// A visible text input snapshot.
pub fn input_snapshot(name: &str) -> ElementSnapshot {
    let mut snapshot = ElementSnapshot {
        tag: "input".to_string(),
        rect: Rect::new(0.0, 0.0, 200.0, 28.0),
        opacity: 1.0,
        ..Default::default()
    };
    snapshot.attributes.insert("name".to_string(), name.to_string());
    snapshot.attributes.insert("type".to_string(), "text".to_string());
    snapshot
}

/// An event on the given frame carrying a snapshot.
pub fn element_event(
    frame: &str,
    kind: RawEventKind,
    snapshot: ElementSnapshot,
    timestamp_ms: u64,
) -> RawEvent {
    RawEvent::new(FrameId::new(frame), kind, timestamp_ms, "https://app.example/")
        .with_snapshot(snapshot)
}
