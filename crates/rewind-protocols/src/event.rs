//! Raw capture events and the frame-to-host delivery channel.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::mpsc;

use crate::descriptor::Rect;

/// Identifier of a monitored content frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub String);

impl FrameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw DOM facts about an event target, captured in-frame at event time.
///
/// This is the input to the descriptor builder. It carries everything the
/// selector ladder needs so no second round-trip into the page is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
    /// Trimmed visible text, bounded at capture time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Live value for form fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub rect: Rect,
    /// `display:none` / `visibility:hidden` on the element or an ancestor.
    pub hidden: bool,
    pub opacity: f64,
    pub disabled: bool,
    /// Text borrowed from a nearby sibling or parent, for icon-only targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearby_text: Option<String>,
    /// Ancestor tag path, nearest first, capped at capture time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ancestors: Vec<String>,
    /// Set when the element sits inside a form; carries the form's
    /// method/action and field names for submit classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FormSnapshot>,
}

impl ElementSnapshot {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Visible means not hidden, not fully transparent, non-zero area.
    pub fn is_visible(&self) -> bool {
        !self.hidden && self.opacity > 0.0 && self.rect.area() > 0.0
    }
}

/// Enclosing form facts for submit classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub method: String,
    pub action: String,
    /// Field (name, type) pairs, values never captured here.
    pub fields: Vec<(String, String)>,
}

/// The kind of a raw event, covering the captured DOM event set plus the
/// synthetic events emitted by navigation/network instrumentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RawEventKind {
    Click,
    Input,
    Change,
    Submit,
    KeyDown { key: String },
    KeyUp { key: String },
    Copy,
    Cut,
    Paste,
    ContextMenu,
    DragStart,
    Drop,
    Scroll { delta_y: f64 },
    MediaPlay,
    MediaPause,
    /// Synthetic: `history.pushState` observed.
    HistoryPushState,
    /// Synthetic: `history.replaceState` observed.
    HistoryReplaceState,
    /// Synthetic: a network fetch completed.
    FetchCompleted { status: u16 },
    /// Synthetic: batched DOM mutation summary over one observation window.
    MutationBatch {
        added_top_level: u32,
        removed_top_level: u32,
        affected: u32,
        large_container: bool,
    },
    /// Synthetic: document finished loading.
    PageLoad,
}

/// An unclassified event crossing the frame-to-host boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub frame: FrameId,
    pub kind: RawEventKind,
    /// Whether the event was user-originated (`isTrusted`).
    pub trusted: bool,
    pub timestamp_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<ElementSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub viewport: (u32, u32),
}

impl RawEvent {
    pub fn new(frame: FrameId, kind: RawEventKind, timestamp_ms: u64, url: impl Into<String>) -> Self {
        Self {
            frame,
            kind,
            trusted: true,
            timestamp_ms,
            snapshot: None,
            value: None,
            url: url.into(),
            title: String::new(),
            viewport: (0, 0),
        }
    }

    pub fn with_snapshot(mut self, snapshot: ElementSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn untrusted(mut self) -> Self {
        self.trusted = false;
        self
    }
}

/// Fire-and-forget delivery channel from a capture agent to the host.
///
/// Ordering is preserved per originating frame (one sender per agent over
/// one queue) but not across frames. Delivery failure is not surfaced to
/// the frame; a closed host simply drops the event.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<RawEvent>,
}

impl EventSink {
    /// Create a bounded channel, returning the sink and the host-side receiver.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<RawEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Emit an event without waiting. Returns false if the host is gone or
    /// the queue is full; callers treat both as a dropped event.
    pub fn emit(&self, event: RawEvent) -> bool {
        self.tx.try_send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
