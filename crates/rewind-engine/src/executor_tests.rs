use rewind_protocols::{ActionType, ExecuteStep, ExecuteTask, ExpectedOutcome, TaskStatus};

use crate::test_support::{ClickEffect, FakeElement, FakePage};

use super::*;

fn executor(page: Arc<FakePage>) -> TaskExecutor {
    TaskExecutor::new(page, ExecutorConfig::default())
}

fn click(selector: &str) -> ExecuteStep {
    ExecuteStep::new(ActionType::Click).with_target(selector)
}

#[tokio::test(start_paused = true)]
async fn test_steps_run_sequentially() {
    let page = Arc::new(FakePage::new("https://app.example/"));
    page.add_element("#q", FakeElement::live());
    page.add_element("#go", FakeElement::live());

    let task = ExecuteTask::new(vec![
        ExecuteStep::new(ActionType::Navigate).with_value("https://app.example/search"),
        ExecuteStep::new(ActionType::TextEntry)
            .with_target("#q")
            .with_value("rust"),
        click("#go"),
    ]);
    let result = executor(page.clone()).execute(task).await;

    assert_eq!(result.status, TaskStatus::Completed);
    assert_eq!(result.completed, 3);
    assert!(!result.partial);
    assert_eq!(
        page.calls(),
        vec![
            "navigate https://app.example/search",
            "query #q",
            "type #q <- rust",
            "query #go",
            "click #go",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_validation_fails_before_any_side_effect() {
    let page = Arc::new(FakePage::new("https://app.example/"));
    page.add_element("#go", FakeElement::live());

    let task = ExecuteTask::new(vec![
        ExecuteStep::new(ActionType::Wait).with_value("soon"),
        click("#go"),
    ]);
    let result = executor(page.clone()).execute(task).await;

    assert_eq!(result.status, TaskStatus::Failed);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].index, 0);
    assert!(page.calls().is_empty(), "no side effects after validation failure");
}

#[tokio::test(start_paused = true)]
async fn test_fallback_selector_used() {
    let page = Arc::new(FakePage::new("https://app.example/"));
    page.add_element("button.submit", FakeElement::live());

    let task = ExecuteTask::new(vec![
        click("#gone").with_fallbacks(vec!["button.submit".to_string()])
    ]);
    let result = executor(page.clone()).execute(task).await;

    assert_eq!(result.status, TaskStatus::Completed);
    assert!(page.calls().contains(&"click button.submit".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_retry_recovers_from_transient_failure() {
    let page = Arc::new(FakePage::new("https://app.example/"));
    page.add_element("#flaky", FakeElement::live());
    page.fail_clicks("#flaky", 1);

    let result = executor(page.clone()).execute(ExecuteTask::new(vec![click("#flaky")])).await;

    assert_eq!(result.status, TaskStatus::Completed);
    let clicks = page.calls().iter().filter(|c| *c == "click #flaky").count();
    assert_eq!(clicks, 2, "first attempt fails, retry succeeds");
}

#[tokio::test(start_paused = true)]
async fn test_step_fails_permanently_after_max_retries() {
    let page = Arc::new(FakePage::new("https://app.example/"));
    page.add_element("#flaky", FakeElement::live());
    page.fail_clicks("#flaky", 10);

    let result = executor(page.clone()).execute(ExecuteTask::new(vec![click("#flaky")])).await;

    assert_eq!(result.status, TaskStatus::Failed);
    assert_eq!(result.completed, 0);
    // Initial attempt plus max_retries (2).
    let clicks = page.calls().iter().filter(|c| *c == "click #flaky").count();
    assert_eq!(clicks, 3);
}

#[tokio::test(start_paused = true)]
async fn test_abort_on_failure_skips_remaining_steps() {
    let page = Arc::new(FakePage::new("https://app.example/"));
    page.add_element("#first", FakeElement::live());
    page.add_element("#after", FakeElement::live());

    let task = ExecuteTask::new(vec![click("#first"), click("#missing"), click("#after")]);
    let result = executor(page.clone()).execute(task).await;

    assert_eq!(result.status, TaskStatus::Failed);
    // The step before the failure is kept; the step after is never reached.
    assert_eq!(result.completed, 1);
    assert!(result.partial, "kept work before the abort makes the result partial");
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].index, 1);
    assert!(page.calls().contains(&"click #first".to_string()));
    assert!(!page.calls().contains(&"query #after".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_continue_on_failure_returns_partial_result() {
    let page = Arc::new(FakePage::new("https://app.example/"));
    page.add_element("#after", FakeElement::live());

    let task = ExecuteTask::new(vec![click("#missing"), click("#after")]).continue_on_failure();
    let result = executor(page.clone()).execute(task).await;

    assert_eq!(result.status, TaskStatus::Failed);
    assert_eq!(result.completed, 1);
    assert!(result.partial);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].index, 0);
    assert!(result.failed[0].error.contains("Target not found"));
}

#[tokio::test(start_paused = true)]
async fn test_expected_outcome_satisfied_by_click_effect() {
    let page = Arc::new(FakePage::new("https://shop.example/cart"));
    page.add_element("#checkout", FakeElement::live());
    page.on_click(
        "#checkout",
        ClickEffect {
            set_url: Some("https://shop.example/checkout/done".to_string()),
            set_body: None,
        },
    );

    let task = ExecuteTask::new(vec![
        click("#checkout").expecting(ExpectedOutcome::UrlContains("/checkout".to_string())),
    ]);
    let result = executor(page).execute(task).await;
    assert_eq!(result.status, TaskStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_outcome_timeout_reported_distinctly() {
    let page = Arc::new(FakePage::new("https://shop.example/cart"));
    page.add_element("#checkout", FakeElement::live());

    let task = ExecuteTask::new(vec![
        click("#checkout").expecting(ExpectedOutcome::UrlContains("/never".to_string())),
    ]);
    let result = executor(page.clone()).execute(task).await;

    assert_eq!(result.status, TaskStatus::Failed);
    assert!(result.failed[0].error.contains("Expected outcome not observed"));
    // The click itself happened; this is not a resolution failure.
    assert!(page.calls().contains(&"click #checkout".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_step_timeout_bounds_slow_actions() {
    let page = Arc::new(FakePage::new("https://app.example/"));
    let mut config = ExecutorConfig::default();
    config.step_timeout_ms = 1_000;
    config.max_retries = 0;
    let executor = TaskExecutor::new(page, config);

    let task = ExecuteTask::new(vec![ExecuteStep::new(ActionType::Wait).with_value("5000")]);
    let result = executor.execute(task).await;

    assert_eq!(result.status, TaskStatus::Failed);
    assert!(result.failed[0].error.contains("timed out after 1000ms"));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_skips_remaining_steps() {
    let page = Arc::new(FakePage::new("https://app.example/"));
    page.add_element("#go", FakeElement::live());

    let executor = executor(page.clone());
    executor.cancellation_token().cancel();
    let result = executor.execute(ExecuteTask::new(vec![click("#go")])).await;

    assert_eq!(result.status, TaskStatus::Failed);
    assert_eq!(result.completed, 0);
    assert!(result.failed[0].error.contains("cancelled"));
    assert!(page.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_text_present_outcome_polls_body() {
    let page = Arc::new(FakePage::new("https://app.example/"));
    page.add_element("#load-more", FakeElement::live());
    page.on_click(
        "#load-more",
        ClickEffect {
            set_url: None,
            set_body: Some("42 results".to_string()),
        },
    );

    let task = ExecuteTask::new(vec![
        click("#load-more").expecting(ExpectedOutcome::TextPresent("results".to_string())),
    ]);
    let result = executor(page).execute(task).await;
    assert_eq!(result.status, TaskStatus::Completed);
}
