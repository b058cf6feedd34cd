//! Element descriptors and relocatable selector strategies.

use serde::{Deserialize, Serialize};

/// How a selector was derived. Ordered roughly by expected stability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    /// Stable `id` attribute.
    Id,
    /// Test/automation data attribute (`data-testid` and friends).
    TestAttribute,
    /// Form field `name`/`type` pair.
    FormField,
    /// Anchor `href` target.
    LinkHref,
    /// Bounded, quoted visible text for buttons and links.
    VisibleText,
    /// Role plus `aria-label`.
    AriaRole,
    /// Non-generated semantic class names.
    SemanticClass,
    /// Nearest-ancestor structural path fallback.
    Structural,
}

/// One scored candidate method for relocating an element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorStrategy {
    pub kind: SelectorKind,
    pub selector: String,
    /// Confidence score, 0-100.
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SelectorStrategy {
    pub fn new(kind: SelectorKind, selector: impl Into<String>, score: u8) -> Self {
        Self {
            kind,
            selector: selector.into(),
            score: score.min(100),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Bounding rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Inferred purpose of an element, derived from tag, type and context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ElementPurpose {
    Navigation,
    Search,
    Auth,
    Toggle,
    Submission,
    Media,
    #[default]
    General,
}

/// A ranked, relocatable description of a DOM element.
///
/// Strategies are always kept sorted by descending score; the primary
/// selector is the highest-scoring one. The sort is enforced on
/// construction so consumers can rely on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementDescriptor {
    strategies: Vec<SelectorStrategy>,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub rect: Rect,
    pub visible: bool,
    pub purpose: ElementPurpose,
    /// Short human-readable description, e.g. `"Submit" button`.
    pub description: String,
}

impl ElementDescriptor {
    pub fn new(tag: impl Into<String>, strategies: Vec<SelectorStrategy>) -> Self {
        let mut descriptor = Self {
            strategies: Vec::new(),
            tag: tag.into(),
            role: None,
            input_type: None,
            text: None,
            rect: Rect::default(),
            visible: true,
            purpose: ElementPurpose::General,
            description: String::new(),
        };
        descriptor.set_strategies(strategies);
        descriptor
    }

    /// Replace the strategy list, re-establishing the descending-score order.
    ///
    /// The sort is stable, so equal scores keep their ladder order.
    pub fn set_strategies(&mut self, mut strategies: Vec<SelectorStrategy>) {
        strategies.sort_by(|a, b| b.score.cmp(&a.score));
        self.strategies = strategies;
    }

    pub fn strategies(&self) -> &[SelectorStrategy] {
        &self.strategies
    }

    /// The highest-scoring strategy, if any survived scoring.
    pub fn primary(&self) -> Option<&SelectorStrategy> {
        self.strategies.first()
    }

    /// All selector strings in fallback order, primary first.
    pub fn selector_ladder(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.selector.clone()).collect()
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
