//! Replay adapter: recorded sessions to executable tasks.
//!
//! Observational actions are dropped (replay verifies outcomes instead of
//! re-emitting observations), debounced text entries become single type
//! steps, and each element step carries the recorded selector ladder.

use tracing::debug;

use rewind_protocols::{
    ActionType, ExecuteStep, ExecuteTask, RecordingSession, SemanticAction,
};

/// Build an executable task reproducing a recorded session.
pub fn task_from_session(session: &RecordingSession) -> ExecuteTask {
    let mut steps = Vec::new();
    if !session.starting_url.is_empty() {
        steps.push(
            ExecuteStep::new(ActionType::Navigate)
                .with_value(session.starting_url.clone())
                .with_reasoning("Return to the recording's starting page"),
        );
    }
    steps.extend(session.actions().iter().filter_map(step_from_action));
    ExecuteTask::new(steps)
}

fn step_from_action(action: &SemanticAction) -> Option<ExecuteStep> {
    if action.action.is_observation() {
        return None;
    }

    let mut step = ExecuteStep::new(action.action).with_reasoning(action.describe());
    if let Some(value) = &action.value {
        step = step.with_value(value.clone());
    }

    if action.action == ActionType::Navigate {
        // The destination URL is the value; no selector needed.
        return Some(step);
    }

    if let Some(descriptor) = &action.target {
        let mut ladder = descriptor.selector_ladder();
        if !ladder.is_empty() {
            step = step.with_target(ladder.remove(0)).with_fallbacks(ladder);
        }
    }
    if action.action.needs_target() && step.target.is_none() {
        debug!(action = %action.action, "recorded action has no selectors, skipped");
        return None;
    }
    Some(step)
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
