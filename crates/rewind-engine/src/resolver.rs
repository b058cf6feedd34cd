//! Selector resolution with fallback.

use tracing::debug;

use rewind_protocols::ExecuteError;

use crate::page::{PageDriver, PageElement};

pub struct SelectorResolver;

impl SelectorResolver {
    /// Try each selector in order, primary first. A match that is invisible
    /// or disabled falls through to the next strategy; a total miss reports
    /// every selector tried.
    pub async fn resolve(
        driver: &dyn PageDriver,
        selectors: &[&str],
    ) -> Result<PageElement, ExecuteError> {
        let mut tried = Vec::with_capacity(selectors.len());
        for selector in selectors {
            tried.push(selector.to_string());
            match driver.query(selector).await? {
                Some(element) if element.visible && element.enabled => {
                    debug!(selector, "target resolved");
                    return Ok(element);
                }
                Some(_) => {
                    debug!(selector, "matched a dead element, trying next strategy");
                }
                None => {}
            }
        }
        Err(ExecuteError::TargetNotFound { tried })
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
