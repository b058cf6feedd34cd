//! Text input aggregation.
//!
//! Keystroke-level events coalesce into one `text_entry` action per
//! element via debouncing. The aggregator owns the buffers and their
//! generation counters; the session controller owns the clock and arms one
//! timer per re-arm, so a buffer has at most one live pending flush - the
//! generation check makes superseded timers no-ops.

use std::collections::HashMap;

use tracing::trace;

use rewind_protocols::{
    ActionType, ElementPurpose, ElementSnapshot, FrameId, PageContext, RawEvent, SemanticAction,
};

use crate::descriptor::DescriptorBuilder;

/// Identity of one text buffer: frame plus a stable element key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferKey {
    pub frame: FrameId,
    pub element: String,
}

impl BufferKey {
    /// Derive the element key from the snapshot: id when present, else
    /// field name, else a positional digest.
    pub fn from_snapshot(frame: &FrameId, snapshot: &ElementSnapshot) -> Self {
        let element = if let Some(id) = snapshot.id.as_deref().filter(|i| !i.is_empty()) {
            format!("#{}", id)
        } else if let Some(name) = snapshot.attr("name").filter(|n| !n.is_empty()) {
            format!("{}[name={}]", snapshot.tag, name)
        } else {
            format!(
                "{}@{:.0},{:.0}",
                snapshot.tag, snapshot.rect.x, snapshot.rect.y
            )
        };
        Self {
            frame: frame.clone(),
            element,
        }
    }
}

struct TextBuffer {
    value: String,
    /// Timestamp of the first keystroke; carried onto the emitted action so
    /// real interaction order is preserved.
    started_ms: u64,
    generation: u64,
    snapshot: ElementSnapshot,
    context: PageContext,
}

pub struct TextInputAggregator {
    buffers: HashMap<BufferKey, TextBuffer>,
    max_len: usize,
    next_generation: u64,
}

impl TextInputAggregator {
    pub fn new(max_len: usize) -> Self {
        Self {
            buffers: HashMap::new(),
            max_len,
            next_generation: 0,
        }
    }

    pub fn pending(&self) -> usize {
        self.buffers.len()
    }

    /// Record one input/keyup event. The buffer's value is *replaced* with
    /// the element's live value, and the debounce is re-armed: the returned
    /// generation must be scheduled by the caller, superseding any earlier
    /// one for this key.
    pub fn on_input(&mut self, key: BufferKey, event: &RawEvent) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;

        let live_value = event
            .value
            .clone()
            .or_else(|| event.snapshot.as_ref().and_then(|s| s.value.clone()))
            .unwrap_or_default();
        let mut live_value = live_value;
        if live_value.len() > self.max_len {
            let mut cut = self.max_len;
            while !live_value.is_char_boundary(cut) {
                cut -= 1;
            }
            live_value.truncate(cut);
        }

        let buffer = self.buffers.entry(key).or_insert_with(|| TextBuffer {
            value: String::new(),
            started_ms: event.timestamp_ms,
            generation,
            snapshot: event.snapshot.clone().unwrap_or_default(),
            context: PageContext {
                url: event.url.clone(),
                title: event.title.clone(),
                viewport: event.viewport,
                landmarks: vec![],
            },
        });
        buffer.value = live_value;
        buffer.generation = generation;
        if let Some(snapshot) = &event.snapshot {
            buffer.snapshot = snapshot.clone();
        }
        generation
    }

    /// Timer-driven flush. A stale generation means the buffer was re-armed
    /// (or already flushed) after this timer was set; nothing happens.
    pub fn flush_due(
        &mut self,
        key: &BufferKey,
        generation: u64,
        builder: &DescriptorBuilder,
    ) -> Option<SemanticAction> {
        if self.buffers.get(key)?.generation != generation {
            trace!(?key, generation, "stale debounce timer ignored");
            return None;
        }
        self.flush_now(key, builder)
    }

    /// Immediate flush (Enter, or session close). An empty or
    /// whitespace-only value is discarded silently.
    pub fn flush_now(
        &mut self,
        key: &BufferKey,
        builder: &DescriptorBuilder,
    ) -> Option<SemanticAction> {
        let buffer = self.buffers.remove(key)?;
        Self::emit(buffer, builder)
    }

    /// Flush every pending buffer for one frame, oldest first.
    pub fn flush_frame(
        &mut self,
        frame: &FrameId,
        builder: &DescriptorBuilder,
    ) -> Vec<SemanticAction> {
        let keys: Vec<BufferKey> = self
            .buffers
            .keys()
            .filter(|k| &k.frame == frame)
            .cloned()
            .collect();
        self.drain(keys, builder)
    }

    /// Force-flush everything, oldest first. Called before a session
    /// closes so no keystroke is ever lost.
    pub fn flush_all(&mut self, builder: &DescriptorBuilder) -> Vec<SemanticAction> {
        let keys: Vec<BufferKey> = self.buffers.keys().cloned().collect();
        self.drain(keys, builder)
    }

    fn drain(&mut self, keys: Vec<BufferKey>, builder: &DescriptorBuilder) -> Vec<SemanticAction> {
        let mut actions: Vec<SemanticAction> = keys
            .into_iter()
            .filter_map(|key| self.flush_now(&key, builder))
            .collect();
        actions.sort_by_key(|a| a.timestamp_ms);
        actions
    }

    fn emit(buffer: TextBuffer, builder: &DescriptorBuilder) -> Option<SemanticAction> {
        if buffer.value.trim().is_empty() {
            return None;
        }
        let descriptor = builder.build(&buffer.snapshot);
        let intent = match descriptor.purpose {
            ElementPurpose::Search => Some("search"),
            ElementPurpose::Auth => Some("authenticate"),
            _ => None,
        };
        let mut action =
            SemanticAction::new(ActionType::TextEntry, buffer.started_ms, buffer.context)
                .with_target(descriptor)
                .with_value(buffer.value);
        if let Some(intent) = intent {
            action = action.with_intent(intent);
        }
        Some(action)
    }
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod tests;
