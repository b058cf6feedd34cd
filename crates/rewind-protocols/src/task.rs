//! Execution steps and tasks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::ActionType;

/// Step lifecycle. Transitions are monotone; terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether `next` is a legal transition from this state.
    pub fn can_advance_to(&self, next: StepStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Running) => true,
            (Self::Running, Self::Completed) | (Self::Running, Self::Failed) => true,
            // Re-running after a failed attempt stays within Running.
            (Self::Running, Self::Running) => true,
            _ => false,
        }
    }
}

/// Overall task lifecycle. Same monotonicity rules as [`StepStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

/// A single instruction to reproduce or perform a page action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteStep {
    pub action: ActionType,
    /// Primary target selector, or URL for `navigate`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Fallback selectors tried in order after `target`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Why the planner emitted this step; carried through to results.
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default)]
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Optional outcome to wait for after the action executes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expect: Option<ExpectedOutcome>,
}

impl ExecuteStep {
    pub fn new(action: ActionType) -> Self {
        Self {
            action,
            target: None,
            fallbacks: Vec::new(),
            value: None,
            reasoning: String::new(),
            status: StepStatus::Pending,
            attempts: 0,
            error: None,
            expect: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_fallbacks(mut self, fallbacks: Vec<String>) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn expecting(mut self, outcome: ExpectedOutcome) -> Self {
        self.expect = Some(outcome);
        self
    }

    /// Full selector ladder: primary target first, then fallbacks.
    pub fn selector_ladder(&self) -> Vec<&str> {
        self.target
            .iter()
            .map(String::as_str)
            .chain(self.fallbacks.iter().map(String::as_str))
            .collect()
    }

    /// Advance the step status, enforcing monotone transitions. An illegal
    /// transition (e.g. reviving a terminal step) is ignored and reported.
    pub fn advance(&mut self, next: StepStatus) -> bool {
        if self.status.can_advance_to(next) {
            self.status = next;
            true
        } else {
            false
        }
    }
}

/// Expected post-action outcome, polled with a bounded timeout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "wait_for", content = "value")]
pub enum ExpectedOutcome {
    UrlContains(String),
    ElementVisible(String),
    TextPresent(String),
}

/// An ordered instruction list, consumed exactly once by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteTask {
    pub id: Uuid,
    pub steps: Vec<ExecuteStep>,
    #[serde(default)]
    pub status: TaskStatus,
    /// Abort remaining steps on the first permanent failure. When false the
    /// task continues and reports a partial result.
    #[serde(default = "default_abort")]
    pub abort_on_failure: bool,
}

fn default_abort() -> bool {
    true
}

impl ExecuteTask {
    pub fn new(steps: Vec<ExecuteStep>) -> Self {
        Self {
            id: Uuid::new_v4(),
            steps,
            status: TaskStatus::Pending,
            abort_on_failure: true,
        }
    }

    pub fn continue_on_failure(mut self) -> Self {
        self.abort_on_failure = false;
        self
    }
}

/// One permanently failed step inside a task result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFailure {
    pub index: usize,
    pub error: String,
}

/// Aggregate outcome of one task run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteResult {
    pub task_id: Uuid,
    pub status: TaskStatus,
    pub completed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<StepFailure>,
    /// True when some steps completed but others permanently failed.
    pub partial: bool,
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
