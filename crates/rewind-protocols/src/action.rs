//! Semantic actions - the closed vocabulary of classified interactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::descriptor::ElementDescriptor;

/// The closed action-type vocabulary.
///
/// Everything a capture session records, or an execution task performs, is
/// one of these. New interaction shapes must be mapped onto an existing
/// variant or deliberately added here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Navigate,
    Click,
    TextEntry,
    SelectOption,
    ToggleCheckbox,
    SelectRadio,
    SelectFile,
    AdjustSlider,
    Copy,
    Cut,
    Paste,
    ContextMenu,
    Submit,
    KeyPress,
    Scroll,
    DragDrop,
    MediaPlay,
    MediaPause,
    Wait,
    PageLoad,
    SearchResultsLoaded,
    DynamicContentChange,
    SpaNavigation,
}

impl ActionType {
    /// Whether execution of this action requires a resolvable target element.
    pub fn needs_target(&self) -> bool {
        matches!(
            self,
            Self::Click
                | Self::TextEntry
                | Self::SelectOption
                | Self::ToggleCheckbox
                | Self::SelectRadio
                | Self::SelectFile
                | Self::AdjustSlider
                | Self::ContextMenu
                | Self::Submit
        )
    }

    /// Observational action types that record page state rather than input.
    pub fn is_observation(&self) -> bool {
        matches!(
            self,
            Self::PageLoad
                | Self::SearchResultsLoaded
                | Self::DynamicContentChange
                | Self::SpaNavigation
        )
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(s.trim_matches('"'))
    }
}

/// Page-level context captured alongside every action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageContext {
    pub url: String,
    pub title: String,
    /// Viewport width and height in CSS pixels.
    pub viewport: (u32, u32),
    /// Key landmark elements present on the page (nav, main, search box...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub landmarks: Vec<String>,
}

/// A normalized, classified interaction with inferred intent and a durable
/// target descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticAction {
    pub id: Uuid,
    pub action: ActionType,
    /// Capture timestamp, epoch milliseconds. For debounced text entry this
    /// is the timestamp of the *first* keystroke, preserving real order.
    pub timestamp_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ElementDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub context: PageContext,
    /// Inferred intent label, e.g. `search`, `authenticate`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

impl SemanticAction {
    pub fn new(action: ActionType, timestamp_ms: u64, context: PageContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            timestamp_ms,
            target: None,
            value: None,
            context,
            intent: None,
        }
    }

    pub fn with_target(mut self, target: ElementDescriptor) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms as i64)
    }

    /// One-line human-readable form, used by the AI-ready export.
    pub fn describe(&self) -> String {
        let subject = self
            .target
            .as_ref()
            .map(|t| t.description.clone())
            .filter(|d| !d.is_empty());

        match (self.action, subject, &self.value) {
            (ActionType::Navigate, _, Some(url)) => format!("Navigated to {}", url),
            (ActionType::TextEntry, Some(s), Some(v)) => format!("Entered \"{}\" into {}", v, s),
            (ActionType::TextEntry, None, Some(v)) => format!("Entered \"{}\"", v),
            (ActionType::Click, Some(s), _) => format!("Clicked {}", s),
            (ActionType::Submit, Some(s), _) => format!("Submitted {}", s),
            (ActionType::KeyPress, _, Some(key)) => format!("Pressed {}", key),
            (ActionType::PageLoad, _, _) => format!("Loaded {}", self.context.url),
            (ActionType::SpaNavigation, _, Some(url)) => format!("In-app navigation to {}", url),
            (ActionType::SearchResultsLoaded, _, Some(count)) => {
                format!("Search results loaded (~{} items)", count)
            }
            (action, Some(s), _) => format!("{} on {}", action, s),
            (action, None, _) => action.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
