//! Semantic action classifier.
//!
//! Maps (raw event, element snapshot) into the closed action-type
//! vocabulary with an inferred intent. Non-interactive targets are filtered
//! out before classification; a malformed event drops that event only.

use regex::Regex;
use tracing::debug;
use url::Url;

use rewind_config::PrivacyConfig;
use rewind_protocols::{
    ActionType, ClassifyError, ElementPurpose, ElementSnapshot, PageContext, RawEvent,
    RawEventKind, SemanticAction,
};

use crate::descriptor::DescriptorBuilder;
use crate::redirect::UnwrapperSet;

const MASK: &str = "***";

pub struct ActionClassifier {
    builder: DescriptorBuilder,
    unwrappers: UnwrapperSet,
    sensitive: Vec<Regex>,
}

impl ActionClassifier {
    pub fn new(builder: DescriptorBuilder, privacy: &PrivacyConfig) -> Self {
        let sensitive = privacy
            .sensitive_patterns
            .iter()
            .filter_map(|p| Regex::new(&format!("(?i){}", p)).ok())
            .collect();
        Self {
            builder,
            unwrappers: UnwrapperSet::default(),
            sensitive,
        }
    }

    pub fn with_unwrappers(mut self, unwrappers: UnwrapperSet) -> Self {
        self.unwrappers = unwrappers;
        self
    }

    /// Classify one raw event. `Ok(None)` means the event was filtered as
    /// insignificant; `Err` means it was malformed and is dropped upstream.
    pub fn classify(&self, event: &RawEvent) -> Result<Option<SemanticAction>, ClassifyError> {
        let context = context_of(event);
        match &event.kind {
            RawEventKind::Click => self.classify_click(event, context),
            RawEventKind::Change => self.classify_change(event, context),
            RawEventKind::Submit => {
                let snapshot = required_snapshot(event)?;
                Ok(Some(self.submit_action(snapshot, event, context)))
            }
            RawEventKind::KeyDown { key } => Ok(Self::classify_key(key, event, context)),
            RawEventKind::Copy => Ok(Some(self.plain(ActionType::Copy, event, context))),
            RawEventKind::Cut => Ok(Some(self.plain(ActionType::Cut, event, context))),
            RawEventKind::Paste => Ok(Some(self.plain(ActionType::Paste, event, context))),
            RawEventKind::ContextMenu => {
                Ok(Some(self.plain(ActionType::ContextMenu, event, context)))
            }
            RawEventKind::Drop | RawEventKind::DragStart => {
                Ok(Some(self.plain(ActionType::DragDrop, event, context)))
            }
            RawEventKind::Scroll { delta_y } => Ok(Some(
                SemanticAction::new(ActionType::Scroll, event.timestamp_ms, context)
                    .with_value(format!("{}", delta_y)),
            )),
            RawEventKind::MediaPlay => Ok(Some(self.plain(ActionType::MediaPlay, event, context))),
            RawEventKind::MediaPause => {
                Ok(Some(self.plain(ActionType::MediaPause, event, context)))
            }
            // Text-producing and navigation kinds are routed to the
            // aggregator / navigation detector, never here.
            kind => Err(ClassifyError::UnsupportedKind(format!("{:?}", kind))),
        }
    }

    fn classify_click(
        &self,
        event: &RawEvent,
        context: PageContext,
    ) -> Result<Option<SemanticAction>, ClassifyError> {
        let snapshot = required_snapshot(event)?;
        if !Self::is_significant(snapshot) {
            debug!(tag = %snapshot.tag, "filtered insignificant click target");
            return Ok(None);
        }

        // Anchor clicks that leave the current origin, or that hit a
        // redirect wrapper, become explicit navigations: the recorded
        // target is the real destination, not the wrapper.
        if snapshot.tag == "a" {
            if let Some(destination) = self.navigation_target(snapshot, &event.url) {
                let descriptor = self.builder.build(snapshot);
                return Ok(Some(
                    SemanticAction::new(ActionType::Navigate, event.timestamp_ms, context)
                        .with_target(descriptor)
                        .with_value(destination)
                        .with_intent("navigate"),
                ));
            }
        }

        if Self::is_submit_shaped(snapshot) {
            return Ok(Some(self.submit_action(snapshot, event, context)));
        }

        let descriptor = self.builder.build(snapshot);
        let intent = intent_of(descriptor.purpose);
        let mut action = SemanticAction::new(ActionType::Click, event.timestamp_ms, context)
            .with_target(descriptor);
        if let Some(intent) = intent {
            action = action.with_intent(intent);
        }
        Ok(Some(action))
    }

    fn classify_change(
        &self,
        event: &RawEvent,
        context: PageContext,
    ) -> Result<Option<SemanticAction>, ClassifyError> {
        let snapshot = required_snapshot(event)?;
        let action_type = match (snapshot.tag.as_str(), snapshot.attr("type")) {
            (_, Some("checkbox")) => ActionType::ToggleCheckbox,
            (_, Some("radio")) => ActionType::SelectRadio,
            (_, Some("file")) => ActionType::SelectFile,
            (_, Some("range")) => ActionType::AdjustSlider,
            ("select", _) => ActionType::SelectOption,
            // Text-field change events duplicate the debounced entry.
            _ => return Ok(None),
        };
        let descriptor = self.builder.build(snapshot);
        let mut action = SemanticAction::new(action_type, event.timestamp_ms, context)
            .with_target(descriptor);
        if let Some(value) = event.value.clone().or_else(|| snapshot.value.clone()) {
            action = action.with_value(value);
        }
        Ok(Some(action))
    }

    fn classify_key(key: &str, event: &RawEvent, context: PageContext) -> Option<SemanticAction> {
        // Ordinary typing belongs to the text aggregator; only discrete
        // control keys are recorded as key presses.
        if !matches!(key, "Enter" | "Escape" | "Tab") {
            return None;
        }
        Some(
            SemanticAction::new(ActionType::KeyPress, event.timestamp_ms, context)
                .with_value(key.to_string()),
        )
    }

    fn plain(&self, action: ActionType, event: &RawEvent, context: PageContext) -> SemanticAction {
        let mut out = SemanticAction::new(action, event.timestamp_ms, context);
        if let Some(snapshot) = &event.snapshot {
            out = out.with_target(self.builder.build(snapshot));
        }
        if let Some(value) = &event.value {
            out = out.with_value(value.clone());
        }
        out
    }

    /// Build a submit action carrying form method/action and a field
    /// summary with sensitive fields masked.
    fn submit_action(
        &self,
        snapshot: &ElementSnapshot,
        event: &RawEvent,
        context: PageContext,
    ) -> SemanticAction {
        let descriptor = self.builder.build(snapshot);
        let summary = snapshot.form.as_ref().map(|form| {
            let fields: Vec<String> = form
                .fields
                .iter()
                .map(|(name, ty)| {
                    if self.is_sensitive(name) || self.is_sensitive(ty) {
                        format!("{}:{}", name, MASK)
                    } else {
                        name.clone()
                    }
                })
                .collect();
            format!(
                "{} {} [{}]",
                form.method.to_uppercase(),
                form.action,
                fields.join(", ")
            )
        });
        let mut action = SemanticAction::new(ActionType::Submit, event.timestamp_ms, context)
            .with_target(descriptor)
            .with_intent("submit-form");
        if let Some(summary) = summary {
            action = action.with_value(summary);
        }
        action
    }

    fn is_sensitive(&self, field: &str) -> bool {
        self.sensitive.iter().any(|re| re.is_match(field))
    }

    /// Submit-typed buttons, and buttons inside a form whose visible text
    /// matches the submit keyword list.
    fn is_submit_shaped(snapshot: &ElementSnapshot) -> bool {
        if snapshot.attr("type") == Some("submit") {
            return true;
        }
        snapshot.form.is_some()
            && snapshot.tag == "button"
            && snapshot
                .text
                .as_deref()
                .is_some_and(DescriptorBuilder::is_submit_text)
    }

    /// Destination URL when an anchor click should be recorded as a
    /// navigation: a redirect wrapper (unwrapped one level) or a
    /// cross-origin target.
    fn navigation_target(&self, snapshot: &ElementSnapshot, page_url: &str) -> Option<String> {
        let href = snapshot.href.as_deref()?;
        let href_url = Url::parse(href).ok()?;

        if let Some(unwrapped) = self.unwrappers.unwrap_target(&href_url) {
            return Some(unwrapped.to_string());
        }
        let page = Url::parse(page_url).ok()?;
        if href_url.origin() != page.origin() {
            return Some(href_url.to_string());
        }
        None
    }

    /// Non-interactive, non-significant targets are filtered out before
    /// classification.
    fn is_significant(snapshot: &ElementSnapshot) -> bool {
        if matches!(snapshot.tag.as_str(), "html" | "body") {
            return false;
        }
        let interactive = matches!(
            snapshot.tag.as_str(),
            "a" | "button" | "input" | "select" | "textarea" | "label" | "option" | "summary"
        );
        interactive
            || snapshot.attr("role").is_some()
            || snapshot.href.is_some()
            || snapshot.attr("onclick").is_some()
            || snapshot
                .text
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty())
    }
}

fn required_snapshot(event: &RawEvent) -> Result<&ElementSnapshot, ClassifyError> {
    event.snapshot.as_ref().ok_or(ClassifyError::MissingSnapshot)
}

fn context_of(event: &RawEvent) -> PageContext {
    PageContext {
        url: event.url.clone(),
        title: event.title.clone(),
        viewport: event.viewport,
        landmarks: vec![],
    }
}

fn intent_of(purpose: ElementPurpose) -> Option<&'static str> {
    match purpose {
        ElementPurpose::Search => Some("search"),
        ElementPurpose::Auth => Some("authenticate"),
        ElementPurpose::Navigation => Some("navigate"),
        ElementPurpose::Toggle => Some("toggle-setting"),
        ElementPurpose::Submission => Some("submit-form"),
        ElementPurpose::Media => Some("media"),
        ElementPurpose::General => None,
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
