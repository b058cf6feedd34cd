//! Scripted page driver for engine tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use rewind_protocols::ExecuteError;

use crate::page::{PageDriver, PageElement};

#[derive(Default, Clone)]
pub struct FakeElement {
    pub visible: bool,
    pub enabled: bool,
    pub text: Option<String>,
}

impl FakeElement {
    pub fn live() -> Self {
        Self {
            visible: true,
            enabled: true,
            text: None,
        }
    }

    pub fn hidden() -> Self {
        Self {
            visible: false,
            enabled: true,
            text: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            visible: true,
            enabled: false,
            text: None,
        }
    }
}

/// Side effect applied to the page when a selector is clicked.
#[derive(Default, Clone)]
pub struct ClickEffect {
    pub set_url: Option<String>,
    pub set_body: Option<String>,
}

#[derive(Default)]
struct FakeState {
    url: String,
    body: String,
    elements: HashMap<String, FakeElement>,
    click_effects: HashMap<String, ClickEffect>,
    /// Remaining forced failures per selector; clicks fail until drained.
    click_failures: HashMap<String, u32>,
    calls: Vec<String>,
}

/// Scripted in-memory page: elements keyed by selector, optional mutation
/// on click, and a call log for assertions.
#[derive(Default)]
pub struct FakePage {
    state: Mutex<FakeState>,
}

impl FakePage {
    pub fn new(url: &str) -> Self {
        let page = Self::default();
        page.state.lock().url = url.to_string();
        page
    }

    pub fn add_element(&self, selector: &str, element: FakeElement) {
        self.state.lock().elements.insert(selector.to_string(), element);
    }

    pub fn set_body(&self, body: &str) {
        self.state.lock().body = body.to_string();
    }

    pub fn on_click(&self, selector: &str, effect: ClickEffect) {
        self.state
            .lock()
            .click_effects
            .insert(selector.to_string(), effect);
    }

    /// Make the next `count` clicks on `selector` fail with a driver error.
    pub fn fail_clicks(&self, selector: &str, count: u32) {
        self.state
            .lock()
            .click_failures
            .insert(selector.to_string(), count);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    fn log(&self, call: String) {
        self.state.lock().calls.push(call);
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn query(&self, selector: &str) -> Result<Option<PageElement>, ExecuteError> {
        self.log(format!("query {}", selector));
        let state = self.state.lock();
        Ok(state.elements.get(selector).map(|e| PageElement {
            handle: selector.to_string(),
            visible: e.visible,
            enabled: e.enabled,
            text: e.text.clone(),
        }))
    }

    async fn click(&self, element: &PageElement) -> Result<(), ExecuteError> {
        self.log(format!("click {}", element.handle));
        let mut state = self.state.lock();
        if let Some(remaining) = state.click_failures.get_mut(&element.handle) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ExecuteError::Driver("scripted click failure".to_string()));
            }
        }
        if let Some(effect) = state.click_effects.get(&element.handle).cloned() {
            if let Some(url) = effect.set_url {
                state.url = url;
            }
            if let Some(body) = effect.set_body {
                state.body = body;
            }
        }
        Ok(())
    }

    async fn type_text(&self, element: &PageElement, text: &str) -> Result<(), ExecuteError> {
        self.log(format!("type {} <- {}", element.handle, text));
        Ok(())
    }

    async fn select_option(
        &self,
        element: &PageElement,
        value: &str,
    ) -> Result<(), ExecuteError> {
        self.log(format!("select {} <- {}", element.handle, value));
        Ok(())
    }

    async fn set_checked(
        &self,
        element: &PageElement,
        checked: bool,
    ) -> Result<(), ExecuteError> {
        self.log(format!("check {} <- {}", element.handle, checked));
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<(), ExecuteError> {
        self.log(format!("key {}", key));
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), ExecuteError> {
        self.log(format!("navigate {}", url));
        self.state.lock().url = url.to_string();
        Ok(())
    }

    async fn scroll_by(&self, delta_y: f64) -> Result<(), ExecuteError> {
        self.log(format!("scroll {}", delta_y));
        Ok(())
    }

    async fn current_url(&self) -> String {
        self.state.lock().url.clone()
    }

    async fn body_text(&self) -> String {
        self.state.lock().body.clone()
    }
}
