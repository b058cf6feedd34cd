//! Navigation and dynamic-content detection.
//!
//! Consumes the synthetic event stream (history hooks, page loads, batched
//! mutation summaries) and turns it into observational actions: SPA route
//! changes, page loads, significant content rewrites, and the one-shot
//! search-result probe. Mutation traffic doubles as a periodic URL check,
//! so route changes that slip past the history hooks are still caught.

use std::collections::HashMap;

use tracing::debug;
use url::Url;

use rewind_config::{CaptureConfig, MutationConfig};
use rewind_protocols::{
    ActionType, FrameId, PageContext, RawEvent, RawEventKind, SemanticAction,
};

/// Minimum repeated-item count for a page to count as a result surface.
const MIN_RESULT_ITEMS: u32 = 3;

/// How a URL change relates to the previous URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// Different origin, or unparseable URLs. A real page-to-page move.
    Full,
    /// Same document, fragment changed only.
    Hash,
    /// Same origin, different path or query. An in-app route change.
    Spa,
}

impl NavigationKind {
    pub fn classify(old: &str, new: &str) -> Self {
        let (Ok(old), Ok(new)) = (Url::parse(old), Url::parse(new)) else {
            return Self::Full;
        };
        if old.origin() != new.origin() {
            return Self::Full;
        }
        if old.path() == new.path() && old.query() == new.query() {
            return Self::Hash;
        }
        Self::Spa
    }
}

struct MutationWindow {
    added: u32,
    removed: u32,
    affected: u32,
    large_container: bool,
    generation: u64,
    started_ms: u64,
    context: PageContext,
}

#[derive(Default)]
struct FrameState {
    last_url: Option<String>,
    window: Option<MutationWindow>,
    /// Set once a result surface was reported for the current page.
    probe_done: bool,
}

pub struct NavigationDetector {
    thresholds: MutationConfig,
    probe_delays_ms: Vec<u64>,
    frames: HashMap<FrameId, FrameState>,
    next_generation: u64,
}

impl NavigationDetector {
    pub fn new(capture: &CaptureConfig, thresholds: MutationConfig) -> Self {
        Self {
            thresholds,
            probe_delays_ms: capture.result_probe_delays_ms.clone(),
            frames: HashMap::new(),
            next_generation: 0,
        }
    }

    /// A `history.pushState`/`replaceState` observation. Hash-only moves
    /// are noise; a path or query change is an SPA navigation.
    pub fn on_history(&mut self, event: &RawEvent) -> Option<SemanticAction> {
        let state = self.frames.entry(event.frame.clone()).or_default();
        let previous = state.last_url.replace(event.url.clone());

        let kind = match previous.as_deref() {
            Some(old) if old == event.url => return None,
            Some(old) => NavigationKind::classify(old, &event.url),
            None => return None,
        };
        if kind == NavigationKind::Hash {
            debug!(url = %event.url, "hash-only history change ignored");
            return None;
        }

        // New route, new content: the probe gets another shot.
        state.probe_done = false;
        Some(
            SemanticAction::new(ActionType::SpaNavigation, event.timestamp_ms, context_of(event))
                .with_value(event.url.clone())
                .with_intent("navigate"),
        )
    }

    /// A document finished loading. Resets per-frame probe state and any
    /// half-open mutation window.
    pub fn on_page_load(&mut self, event: &RawEvent) -> SemanticAction {
        let state = self.frames.entry(event.frame.clone()).or_default();
        state.last_url = Some(event.url.clone());
        state.window = None;
        state.probe_done = false;
        SemanticAction::new(ActionType::PageLoad, event.timestamp_ms, context_of(event))
    }

    /// Compare an event's URL against the frame's last known URL. Mutation
    /// batches call this on every tick, so an in-app route change whose
    /// `pushState` was never observed still surfaces as an `SpaNavigation`.
    /// Hash-only drift updates the baseline silently.
    pub fn observe_url(&mut self, event: &RawEvent) -> Option<SemanticAction> {
        let state = self.frames.entry(event.frame.clone()).or_default();
        let old = match state.last_url.replace(event.url.clone()) {
            Some(old) if old != event.url => old,
            Some(_) => return None,
            None => return None,
        };
        if NavigationKind::classify(&old, &event.url) == NavigationKind::Hash {
            return None;
        }

        debug!(from = %old, to = %event.url, "route change detected by URL drift");
        state.probe_done = false;
        Some(
            SemanticAction::new(ActionType::SpaNavigation, event.timestamp_ms, context_of(event))
                .with_value(event.url.clone())
                .with_intent("navigate"),
        )
    }

    /// Fold one mutation batch into the frame's open window. Returns the
    /// window generation when this batch *opened* a window, so the caller
    /// arms exactly one flush timer per window.
    pub fn on_mutation(&mut self, event: &RawEvent) -> Option<u64> {
        let RawEventKind::MutationBatch {
            added_top_level,
            removed_top_level,
            affected,
            large_container,
        } = event.kind
        else {
            return None;
        };

        let state = self.frames.entry(event.frame.clone()).or_default();
        match &mut state.window {
            Some(window) => {
                window.added += added_top_level;
                window.removed += removed_top_level;
                window.affected += affected;
                window.large_container |= large_container;
                None
            }
            None => {
                self.next_generation += 1;
                let generation = self.next_generation;
                state.window = Some(MutationWindow {
                    added: added_top_level,
                    removed: removed_top_level,
                    affected,
                    large_container,
                    generation,
                    started_ms: event.timestamp_ms,
                    context: context_of(event),
                });
                Some(generation)
            }
        }
    }

    /// Close the frame's mutation window when its timer fires. Emits one
    /// `DynamicContentChange` if the accumulated batch clears a threshold;
    /// sub-threshold windows are discarded.
    pub fn flush_window(&mut self, frame: &FrameId, generation: u64) -> Option<SemanticAction> {
        let state = self.frames.get_mut(frame)?;
        if state.window.as_ref()?.generation != generation {
            return None;
        }
        let window = state.window.take()?;

        let significant = window.added > self.thresholds.min_top_level
            || window.removed > self.thresholds.min_top_level
            || window.affected > self.thresholds.min_affected
            || window.large_container;
        if !significant {
            debug!(
                added = window.added,
                removed = window.removed,
                affected = window.affected,
                "mutation window below thresholds, discarded"
            );
            return None;
        }

        let mut summary = format!(
            "+{}/-{} nodes, {} affected",
            window.added, window.removed, window.affected
        );
        if window.large_container {
            summary.push_str(", large container");
        }
        Some(
            SemanticAction::new(
                ActionType::DynamicContentChange,
                window.started_ms,
                window.context,
            )
            .with_value(summary),
        )
    }

    /// Probe schedule for a freshly navigated frame.
    pub fn probe_delays(&self) -> &[u64] {
        &self.probe_delays_ms
    }

    /// Whether the result probe should still run for this frame.
    pub fn should_probe(&self, frame: &FrameId) -> bool {
        self.frames.get(frame).map(|s| !s.probe_done).unwrap_or(true)
    }

    /// Report a probed result-surface count. The first detection past the
    /// item threshold emits one `SearchResultsLoaded`; everything after is
    /// suppressed until the next navigation.
    pub fn record_results(
        &mut self,
        frame: &FrameId,
        count: u32,
        timestamp_ms: u64,
        context: PageContext,
    ) -> Option<SemanticAction> {
        if count < MIN_RESULT_ITEMS {
            return None;
        }
        let state = self.frames.entry(frame.clone()).or_default();
        if state.probe_done {
            return None;
        }
        state.probe_done = true;
        Some(
            SemanticAction::new(ActionType::SearchResultsLoaded, timestamp_ms, context)
                .with_value(count.to_string()),
        )
    }

    /// Drop all per-frame state, e.g. when the frame unregisters.
    pub fn forget_frame(&mut self, frame: &FrameId) {
        self.frames.remove(frame);
    }
}

fn context_of(event: &RawEvent) -> PageContext {
    PageContext {
        url: event.url.clone(),
        title: event.title.clone(),
        viewport: event.viewport,
        landmarks: vec![],
    }
}

#[cfg(test)]
#[path = "navigation_tests.rs"]
mod tests;
