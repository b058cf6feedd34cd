//! Page driver seam.
//!
//! The engine talks to a page through this trait only. A production driver
//! wraps real browser automation; tests use the scripted fake.

use async_trait::async_trait;

use rewind_protocols::ExecuteError;

/// A resolved element handle plus the state the engine decides on.
#[derive(Debug, Clone)]
pub struct PageElement {
    /// The selector that matched, used as the handle for follow-up calls.
    pub handle: String,
    pub visible: bool,
    pub enabled: bool,
    pub text: Option<String>,
}

/// Minimal driving surface over a live page.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Query one selector. `Ok(None)` is a clean miss.
    async fn query(&self, selector: &str) -> Result<Option<PageElement>, ExecuteError>;

    async fn click(&self, element: &PageElement) -> Result<(), ExecuteError>;
    async fn type_text(&self, element: &PageElement, text: &str) -> Result<(), ExecuteError>;
    async fn select_option(&self, element: &PageElement, value: &str)
    -> Result<(), ExecuteError>;
    async fn set_checked(&self, element: &PageElement, checked: bool)
    -> Result<(), ExecuteError>;
    async fn press_key(&self, key: &str) -> Result<(), ExecuteError>;
    async fn navigate(&self, url: &str) -> Result<(), ExecuteError>;
    async fn scroll_by(&self, delta_y: f64) -> Result<(), ExecuteError>;

    async fn current_url(&self) -> String;
    async fn body_text(&self) -> String;
}
