//! Structural step validation.
//!
//! Runs over the whole task before any side effect. A single invalid step
//! fails the task up front with `ExecuteError::Validation` naming it.

use rewind_protocols::{ActionType, ExecuteError, ExecuteStep, ExecuteTask};

pub struct ActionValidator;

impl ActionValidator {
    pub fn validate(task: &ExecuteTask) -> Result<(), ExecuteError> {
        for (index, step) in task.steps.iter().enumerate() {
            Self::validate_step(index, step)?;
        }
        Ok(())
    }

    fn validate_step(index: usize, step: &ExecuteStep) -> Result<(), ExecuteError> {
        let fail = |message: &str| {
            Err(ExecuteError::Validation {
                step: index,
                message: message.to_string(),
            })
        };

        match step.action {
            ActionType::Navigate => {
                if step.target.is_none() && step.value.is_none() {
                    return fail("navigate requires a target or value URL");
                }
            }
            ActionType::Wait => match step.value.as_deref().map(str::parse::<u64>) {
                Some(Ok(_)) => {}
                _ => return fail("wait requires a numeric millisecond value"),
            },
            ActionType::Scroll => match step.value.as_deref().map(str::parse::<f64>) {
                Some(Ok(_)) => {}
                _ => return fail("scroll requires a numeric delta value"),
            },
            ActionType::KeyPress => {
                if step.value.as_deref().is_none_or(str::is_empty) {
                    return fail("key_press requires a key value");
                }
            }
            action if action.needs_target() => {
                if step.target.as_deref().is_none_or(str::is_empty) {
                    return fail("action requires a target selector");
                }
                if action == ActionType::TextEntry
                    && step.value.as_deref().is_none_or(str::is_empty)
                {
                    return fail("text_entry requires a value");
                }
            }
            // Observational types carry no execution requirements.
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
