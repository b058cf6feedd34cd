//! AI-ready session export.
//!
//! Flattens a recorded session into ordered, human-readable step lines
//! suitable for handing to a model, plus enough structure to stay
//! machine-consumable.

use serde::Serialize;

use rewind_protocols::{ActionType, RecordingSession};

/// One exported step.
#[derive(Debug, Clone, Serialize)]
pub struct ExportStep {
    pub seq: usize,
    /// Human-readable line, e.g. `Clicked "Submit" button`.
    pub line: String,
    pub action: ActionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    pub url: String,
}

/// Flattened, bounded view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionExport {
    pub session_id: String,
    pub starting_url: String,
    pub duration_ms: u64,
    pub pages_visited: Vec<String>,
    pub steps: Vec<ExportStep>,
    /// Set when the step list was cut off at the configured maximum.
    pub truncated: bool,
}

impl SessionExport {
    /// Build the export, keeping at most `max_steps` steps.
    pub fn from_session(session: &RecordingSession, max_steps: usize) -> Self {
        let total = session.action_count();
        let steps = session
            .actions()
            .iter()
            .take(max_steps)
            .enumerate()
            .map(|(i, action)| ExportStep {
                seq: i + 1,
                line: action.describe(),
                action: action.action,
                intent: action.intent.clone(),
                url: action.context.url.clone(),
            })
            .collect();
        Self {
            session_id: session.id.clone(),
            starting_url: session.starting_url.clone(),
            duration_ms: session.duration_ms,
            pages_visited: session.pages_visited(),
            steps,
            truncated: total > max_steps,
        }
    }

    /// Plain-text rendering: numbered steps plus a page-visit summary.
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "Recorded session {} starting at {}\n\nSteps:\n",
            self.session_id, self.starting_url
        );
        for step in &self.steps {
            out.push_str(&format!("{}. {}\n", step.seq, step.line));
        }
        if self.truncated {
            out.push_str("(further steps omitted)\n");
        }
        if !self.pages_visited.is_empty() {
            out.push_str("\nPages visited:\n");
            for page in &self.pages_visited {
                out.push_str(&format!("- {}\n", page));
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
