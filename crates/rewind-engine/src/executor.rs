//! Sequential task executor.
//!
//! One task at a time, steps strictly in order. Each step gets a bounded
//! budget covering both the action and its optional outcome wait, and
//! retries with linear backoff while the failure is retryable.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use rewind_config::ExecutorConfig;
use rewind_protocols::{
    ActionType, ExecuteError, ExecuteResult, ExecuteStep, ExecuteTask, ExpectedOutcome,
    StepFailure, StepStatus, TaskStatus,
};

use crate::page::PageDriver;
use crate::resolver::SelectorResolver;
use crate::validator::ActionValidator;

pub struct TaskExecutor {
    driver: Arc<dyn PageDriver>,
    config: ExecutorConfig,
    cancel: CancellationToken,
}

impl TaskExecutor {
    pub fn new(driver: Arc<dyn PageDriver>, config: ExecutorConfig) -> Self {
        Self {
            driver,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Token for cancelling the running task. Checked between steps;
    /// in-flight side effects are not undone.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the task to completion, abortion or cancellation.
    pub async fn execute(&self, mut task: ExecuteTask) -> ExecuteResult {
        if let Err(e) = ActionValidator::validate(&task) {
            let index = match &e {
                ExecuteError::Validation { step, .. } => *step,
                _ => 0,
            };
            return ExecuteResult {
                task_id: task.id,
                status: TaskStatus::Failed,
                completed: 0,
                failed: vec![StepFailure {
                    index,
                    error: e.to_string(),
                }],
                partial: false,
            };
        }

        task.status = TaskStatus::Running;
        let abort_on_failure = task.abort_on_failure && self.config.abort_on_failure;
        let mut completed = 0usize;
        let mut failed: Vec<StepFailure> = Vec::new();

        'steps: for index in 0..task.steps.len() {
            if self.cancel.is_cancelled() {
                info!(task = %task.id, index, "task cancelled, remaining steps skipped");
                failed.push(StepFailure {
                    index,
                    error: ExecuteError::Cancelled.to_string(),
                });
                break;
            }

            task.steps[index].advance(StepStatus::Running);
            loop {
                task.steps[index].attempts += 1;
                let attempt = task.steps[index].attempts;
                match self.run_step(&task.steps[index]).await {
                    Ok(()) => {
                        task.steps[index].advance(StepStatus::Completed);
                        completed += 1;
                        break;
                    }
                    Err(e) if e.is_retryable() && attempt <= self.config.max_retries => {
                        warn!(index, attempt, error = %e, "step failed, retrying");
                        let backoff = self.config.retry_backoff_ms * attempt as u64;
                        tokio::time::sleep(Duration::from_millis(backoff)).await;
                        task.steps[index].advance(StepStatus::Running);
                    }
                    Err(e) => {
                        warn!(index, attempt, error = %e, "step permanently failed");
                        task.steps[index].error = Some(e.to_string());
                        task.steps[index].advance(StepStatus::Failed);
                        failed.push(StepFailure {
                            index,
                            error: e.to_string(),
                        });
                        if abort_on_failure {
                            break 'steps;
                        }
                        break;
                    }
                }
            }
        }

        task.status = if failed.is_empty() {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        };
        ExecuteResult {
            task_id: task.id,
            status: task.status,
            completed,
            partial: completed > 0 && !failed.is_empty(),
            failed,
        }
    }

    /// One attempt: perform the action, then wait for the expected outcome,
    /// all within the step budget.
    async fn run_step(&self, step: &ExecuteStep) -> Result<(), ExecuteError> {
        let budget = Duration::from_millis(self.config.step_timeout_ms);
        let started = Instant::now();
        match tokio::time::timeout(budget, self.perform(step)).await {
            Ok(result) => result?,
            Err(_) => return Err(ExecuteError::StepTimeout(self.config.step_timeout_ms)),
        }
        if let Some(expect) = &step.expect {
            let remaining = budget.saturating_sub(started.elapsed());
            self.await_outcome(expect, remaining).await?;
        }
        Ok(())
    }

    async fn perform(&self, step: &ExecuteStep) -> Result<(), ExecuteError> {
        let driver = self.driver.as_ref();
        let value = step.value.as_deref().unwrap_or("");

        match step.action {
            ActionType::Navigate => {
                let url = step.target.as_deref().unwrap_or(value);
                driver.navigate(url).await
            }
            ActionType::Wait => {
                // Validated numeric.
                let ms: u64 = value.parse().unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(())
            }
            ActionType::Scroll => {
                let delta: f64 = value.parse().unwrap_or(0.0);
                driver.scroll_by(delta).await
            }
            ActionType::KeyPress => driver.press_key(value).await,
            ActionType::Click | ActionType::Submit | ActionType::ContextMenu => {
                let element = self.resolve(step).await?;
                driver.click(&element).await
            }
            ActionType::TextEntry => {
                let element = self.resolve(step).await?;
                driver.type_text(&element, value).await
            }
            ActionType::SelectOption => {
                let element = self.resolve(step).await?;
                driver.select_option(&element, value).await
            }
            ActionType::ToggleCheckbox => {
                let element = self.resolve(step).await?;
                driver.set_checked(&element, value != "false").await
            }
            ActionType::SelectRadio => {
                let element = self.resolve(step).await?;
                driver.set_checked(&element, true).await
            }
            ActionType::AdjustSlider => {
                let element = self.resolve(step).await?;
                driver.type_text(&element, value).await
            }
            ActionType::MediaPlay | ActionType::MediaPause => {
                // Media controls toggle by click when a target was recorded.
                if step.target.is_some() {
                    let element = self.resolve(step).await?;
                    driver.click(&element).await
                } else {
                    Ok(())
                }
            }
            ActionType::SelectFile | ActionType::DragDrop => Err(ExecuteError::Driver(format!(
                "{} is not supported by the page driver",
                step.action
            ))),
            ActionType::Copy | ActionType::Cut | ActionType::Paste => {
                let key = match step.action {
                    ActionType::Copy => "Control+c",
                    ActionType::Cut => "Control+x",
                    _ => "Control+v",
                };
                driver.press_key(key).await
            }
            // Observations replay as no-ops; navigation state is verified
            // through `expect` clauses instead.
            ActionType::PageLoad
            | ActionType::SearchResultsLoaded
            | ActionType::DynamicContentChange
            | ActionType::SpaNavigation => {
                debug!(action = %step.action, "observational step skipped");
                Ok(())
            }
        }
    }

    async fn resolve(&self, step: &ExecuteStep) -> Result<crate::page::PageElement, ExecuteError> {
        SelectorResolver::resolve(self.driver.as_ref(), &step.selector_ladder()).await
    }

    /// Poll the page until the outcome holds or the remaining budget runs
    /// out. Timeout here is reported distinctly from resolution failure.
    async fn await_outcome(
        &self,
        expect: &ExpectedOutcome,
        budget: Duration,
    ) -> Result<(), ExecuteError> {
        let poll = Duration::from_millis(self.config.outcome_poll_ms);
        let deadline = Instant::now() + budget;
        loop {
            if self.outcome_holds(expect).await {
                return Ok(());
            }
            if Instant::now() + poll > deadline {
                return Err(ExecuteError::OutcomeTimeout {
                    expected: describe_outcome(expect),
                    waited_ms: budget.as_millis() as u64,
                });
            }
            tokio::time::sleep(poll).await;
        }
    }

    async fn outcome_holds(&self, expect: &ExpectedOutcome) -> bool {
        match expect {
            ExpectedOutcome::UrlContains(fragment) => {
                self.driver.current_url().await.contains(fragment)
            }
            ExpectedOutcome::ElementVisible(selector) => {
                matches!(self.driver.query(selector).await, Ok(Some(el)) if el.visible)
            }
            ExpectedOutcome::TextPresent(text) => self.driver.body_text().await.contains(text),
        }
    }
}

fn describe_outcome(expect: &ExpectedOutcome) -> String {
    match expect {
        ExpectedOutcome::UrlContains(s) => format!("url contains {}", s),
        ExpectedOutcome::ElementVisible(s) => format!("element visible {}", s),
        ExpectedOutcome::TextPresent(s) => format!("text present {}", s),
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
