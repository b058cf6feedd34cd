//! Pluggable redirect unwrapping.
//!
//! Search providers wrap outbound result links in redirect URLs. Rather
//! than parsing one provider's markup, unwrapping is a strategy list: each
//! strategy gets one look at the href and may produce the real destination.
//! Exactly one level of indirection is unwrapped - nested wrappers are the
//! destination's problem.

use url::Url;

/// One method of recovering a destination from a wrapper URL.
pub trait RedirectUnwrapper: Send + Sync {
    fn unwrap_target(&self, url: &Url) -> Option<Url>;
}

/// Unwraps `https://host/path?q=<destination>` style wrappers by checking a
/// configurable list of query parameters for an absolute http(s) URL.
pub struct QueryParamUnwrapper {
    params: Vec<String>,
}

impl QueryParamUnwrapper {
    pub fn new(params: Vec<String>) -> Self {
        Self { params }
    }
}

impl Default for QueryParamUnwrapper {
    fn default() -> Self {
        Self::new(
            ["q", "u", "url", "dest", "destination", "redirect", "target", "continue"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

impl RedirectUnwrapper for QueryParamUnwrapper {
    fn unwrap_target(&self, url: &Url) -> Option<Url> {
        for (key, value) in url.query_pairs() {
            if !self.params.iter().any(|p| p == key.as_ref()) {
                continue;
            }
            if let Ok(target) = Url::parse(value.as_ref()) {
                if matches!(target.scheme(), "http" | "https") {
                    return Some(target);
                }
            }
        }
        None
    }
}

/// Ordered strategy list; first hit wins.
pub struct UnwrapperSet {
    strategies: Vec<Box<dyn RedirectUnwrapper>>,
}

impl UnwrapperSet {
    pub fn new(strategies: Vec<Box<dyn RedirectUnwrapper>>) -> Self {
        Self { strategies }
    }

    /// Unwrap one level of indirection, if any strategy recognizes the URL.
    pub fn unwrap_target(&self, url: &Url) -> Option<Url> {
        self.strategies.iter().find_map(|s| s.unwrap_target(url))
    }
}

impl Default for UnwrapperSet {
    fn default() -> Self {
        Self::new(vec![Box::new(QueryParamUnwrapper::default())])
    }
}
