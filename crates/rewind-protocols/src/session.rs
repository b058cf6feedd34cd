//! Recording sessions - ordered, append-only action logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::action::SemanticAction;
use crate::error::CaptureError;

/// An ordered, append-only log of classified actions.
///
/// Immutable once closed: `append` rejects new actions after `close`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSession {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub starting_url: String,
    actions: Vec<SemanticAction>,
    pub duration_ms: u64,
    closed: bool,
}

impl RecordingSession {
    pub fn new(id: impl Into<String>, starting_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            starting_url: starting_url.into(),
            actions: Vec::new(),
            duration_ms: 0,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn actions(&self) -> &[SemanticAction] {
        &self.actions
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Append a classified action. Fails once the session is closed.
    pub fn append(&mut self, action: SemanticAction) -> Result<(), CaptureError> {
        if self.closed {
            return Err(CaptureError::SessionClosed(self.id.clone()));
        }
        self.actions.push(action);
        Ok(())
    }

    /// Finalize the session. Idempotent; duration is fixed on first call.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.duration_ms = (Utc::now() - self.created_at).num_milliseconds().max(0) as u64;
        }
    }

    /// Distinct page URLs touched by the session, in first-visit order.
    pub fn pages_visited(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut pages = Vec::new();
        for action in &self.actions {
            if seen.insert(action.context.url.clone()) {
                pages.push(action.context.url.clone());
            }
        }
        pages
    }

    pub fn metadata(&self) -> SessionMetadata {
        let pages = self.pages_visited();
        SessionMetadata {
            id: self.id.clone(),
            created_at: self.created_at,
            starting_url: self.starting_url.clone(),
            action_count: self.actions.len(),
            duration_ms: self.duration_ms,
            pages_visited: pages.len(),
            complexity: self.complexity(),
        }
    }

    /// Rough complexity score: actions weighted by page spread. Used for
    /// session listing, not for any control decision.
    fn complexity(&self) -> u32 {
        let pages = self.pages_visited().len() as u32;
        self.actions.len() as u32 + pages.saturating_sub(1) * 5
    }
}

/// Summary persisted alongside the action log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub starting_url: String,
    pub action_count: usize,
    pub duration_ms: u64,
    pub pages_visited: usize,
    pub complexity: u32,
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
