//! Execution errors.
//!
//! Selector-resolution failures and outcome timeouts are distinct and
//! reported separately; validation fails the whole task up front.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("Step {step} is structurally invalid: {message}")]
    Validation { step: usize, message: String },

    #[error("Target not found: no strategy matched a live element ({} tried)", tried.len())]
    TargetNotFound { tried: Vec<String> },

    #[error("Expected outcome not observed within {waited_ms}ms: {expected}")]
    OutcomeTimeout { expected: String, waited_ms: u64 },

    #[error("Step timed out after {0}ms")]
    StepTimeout(u64),

    #[error("Task was cancelled")]
    Cancelled,

    #[error("Page driver error: {0}")]
    Driver(String),
}

impl ExecuteError {
    /// Whether a retry of the same step may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Validation { .. } | Self::Cancelled => false,
            Self::TargetNotFound { .. }
            | Self::OutcomeTimeout { .. }
            | Self::StepTimeout(_)
            | Self::Driver(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_not_found_counts_strategies() {
        let err = ExecuteError::TargetNotFound {
            tried: vec!["#a".to_string(), ".b".to_string()],
        };
        assert!(err.to_string().contains("2 tried"));
    }

    #[test]
    fn test_validation_not_retryable() {
        let err = ExecuteError::Validation {
            step: 0,
            message: "navigate without target".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("Step 0"));
    }

    #[test]
    fn test_resolution_and_timeout_retryable() {
        assert!(ExecuteError::TargetNotFound { tried: vec![] }.is_retryable());
        assert!(ExecuteError::OutcomeTimeout {
            expected: "url contains /done".to_string(),
            waited_ms: 30000,
        }
        .is_retryable());
        assert!(!ExecuteError::Cancelled.is_retryable());
    }
}
