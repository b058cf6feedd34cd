//! Element descriptor builder.
//!
//! Computes the ranked selector-strategy ladder plus semantic and visual
//! metadata for an element snapshot. Each strategy is scored independently
//! from the tunable table in [`SelectorConfig`]; viable strategies are all
//! kept, sorted by descending score, and the highest becomes the primary.

use once_cell::sync::Lazy;
use regex::Regex;

use rewind_config::SelectorConfig;
use rewind_protocols::{
    ElementDescriptor, ElementPurpose, ElementSnapshot, SelectorKind, SelectorStrategy,
};

/// Test/automation data attributes, in preference order.
const TEST_ATTRIBUTES: [&str; 4] = ["data-testid", "data-test", "data-cy", "data-qa"];

/// Ids that look machine-generated are useless across reloads.
static GENERATED_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(ember|react|radix|:r)|^\d|[0-9a-f]{8}-[0-9a-f]{4}|\d{4,}").unwrap()
});

/// Hashed or CSS-in-JS class names: `css-1q2w3e`, `sc-bdfBwQ`, raw hashes.
static HASHED_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(css|sc|jss|jsx|emotion|chakra|mui)-|^[a-f0-9]{6,}$|_{2}[a-zA-Z0-9]{5,}$").unwrap()
});

/// Utility-style classes (tailwind and friends) carry no element identity.
static UTILITY_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^-?(p|m|px|py|pt|pb|pl|pr|mx|my|mt|mb|ml|mr|w|h|gap|text|bg|font|flex|grid|",
        r"items|justify|rounded|border|shadow|hover|focus|sm|md|lg|xl)(-|$)"
    ))
    .unwrap()
});

static SUBMIT_KEYWORDS: [&str; 8] = [
    "submit", "search", "sign in", "log in", "login", "continue", "send", "go",
];

pub struct DescriptorBuilder {
    config: SelectorConfig,
}

impl DescriptorBuilder {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    /// Build the full descriptor for a snapshot.
    pub fn build(&self, snapshot: &ElementSnapshot) -> ElementDescriptor {
        let strategies = self.strategies(snapshot);
        let mut descriptor = ElementDescriptor::new(snapshot.tag.clone(), strategies);
        descriptor.role = Some(Self::role_of(snapshot));
        descriptor.input_type = snapshot.attr("type").map(str::to_string);
        descriptor.text = snapshot.text.clone();
        descriptor.rect = snapshot.rect;
        descriptor.visible = snapshot.is_visible();
        descriptor.purpose = Self::purpose_of(snapshot);
        descriptor.description = Self::describe(snapshot);
        descriptor
    }

    /// Compute every viable strategy. Order here is the ladder precedence;
    /// the descriptor re-sorts by score, so a re-tuned table reorders the
    /// ladder without code changes.
    fn strategies(&self, snapshot: &ElementSnapshot) -> Vec<SelectorStrategy> {
        let mut out = Vec::new();
        let cfg = &self.config;

        if let Some(id) = snapshot.id.as_deref().filter(|id| Self::is_stable_id(id)) {
            out.push(SelectorStrategy::new(
                SelectorKind::Id,
                format!("#{}", id),
                cfg.id_score,
            ));
        }

        for attr in TEST_ATTRIBUTES {
            if let Some(value) = snapshot.attr(attr).filter(|v| !v.is_empty()) {
                out.push(SelectorStrategy::new(
                    SelectorKind::TestAttribute,
                    format!("[{}=\"{}\"]", attr, value),
                    cfg.test_attribute_score,
                ));
                break;
            }
        }

        if let Some(name) = snapshot.attr("name").filter(|n| !n.is_empty()) {
            let selector = match snapshot.attr("type") {
                Some(ty) => format!("{}[name=\"{}\"][type=\"{}\"]", snapshot.tag, name, ty),
                None => format!("{}[name=\"{}\"]", snapshot.tag, name),
            };
            out.push(SelectorStrategy::new(
                SelectorKind::FormField,
                selector,
                cfg.form_field_score,
            ));
        }

        if snapshot.tag == "a" {
            if let Some(strategy) = self.link_strategy(snapshot) {
                out.push(strategy);
            }
        }

        if let Some(strategy) = self.text_strategy(snapshot) {
            out.push(strategy);
        }

        if let Some(label) = snapshot.attr("aria-label").filter(|l| !l.is_empty()) {
            let selector = match snapshot.attr("role") {
                Some(role) => format!("[role=\"{}\"][aria-label=\"{}\"]", role, label),
                None => format!("{}[aria-label=\"{}\"]", snapshot.tag, label),
            };
            out.push(SelectorStrategy::new(
                SelectorKind::AriaRole,
                selector,
                cfg.aria_role_score,
            ));
        }

        if let Some(strategy) = self.class_strategy(snapshot) {
            out.push(strategy);
        }

        out.push(self.structural_strategy(snapshot));
        out
    }

    /// Link target selector. An exact path is preferred over a
    /// hostname-only match, which is noted and scored lower.
    fn link_strategy(&self, snapshot: &ElementSnapshot) -> Option<SelectorStrategy> {
        let href = snapshot.href.as_deref().filter(|h| !h.is_empty())?;
        let score = self.config.link_href_score;
        match url::Url::parse(href) {
            Ok(parsed) if parsed.path() != "/" && !parsed.path().is_empty() => {
                Some(SelectorStrategy::new(
                    SelectorKind::LinkHref,
                    format!("a[href=\"{}\"]", href),
                    score,
                ))
            }
            Ok(parsed) => {
                let host = parsed.host_str()?;
                Some(
                    SelectorStrategy::new(
                        SelectorKind::LinkHref,
                        format!("a[href*=\"{}\"]", host),
                        score.saturating_sub(10),
                    )
                    .with_note("hostname only"),
                )
            }
            // Relative hrefs are exact paths already.
            Err(_) => Some(SelectorStrategy::new(
                SelectorKind::LinkHref,
                format!("a[href=\"{}\"]", href),
                score,
            )),
        }
    }

    /// Bounded, quoted visible text - only for buttons and links, where
    /// text is part of the interface contract.
    fn text_strategy(&self, snapshot: &ElementSnapshot) -> Option<SelectorStrategy> {
        if !matches!(snapshot.tag.as_str(), "button" | "a")
            && snapshot.attr("role") != Some("button")
        {
            return None;
        }
        let text = snapshot.text.as_deref().map(str::trim).filter(|t| {
            !t.is_empty() && t.len() <= self.config.max_text_len
        })?;
        Some(SelectorStrategy::new(
            SelectorKind::VisibleText,
            format!("{}:text(\"{}\")", snapshot.tag, text.replace('"', "\\\"")),
            self.config.visible_text_score,
        ))
    }

    /// Up to two semantic class names; hashed and utility classes are
    /// filtered out.
    fn class_strategy(&self, snapshot: &ElementSnapshot) -> Option<SelectorStrategy> {
        let semantic: Vec<&str> = snapshot
            .classes
            .iter()
            .map(String::as_str)
            .filter(|c| Self::is_semantic_class(c))
            .take(2)
            .collect();
        if semantic.is_empty() {
            return None;
        }
        let selector = format!("{}.{}", snapshot.tag, semantic.join("."));
        Some(SelectorStrategy::new(
            SelectorKind::SemanticClass,
            selector,
            self.config.semantic_class_score,
        ))
    }

    /// Nearest-ancestor structural path, capped at a shallow depth. Always
    /// viable, always last resort.
    fn structural_strategy(&self, snapshot: &ElementSnapshot) -> SelectorStrategy {
        let depth = self.config.max_structural_depth;
        let mut path: Vec<&str> = snapshot
            .ancestors
            .iter()
            .take(depth)
            .map(String::as_str)
            .collect();
        path.reverse();
        path.push(&snapshot.tag);
        SelectorStrategy::new(
            SelectorKind::Structural,
            path.join(" > "),
            self.config.structural_score,
        )
        .with_note("structural fallback")
    }

    fn is_stable_id(id: &str) -> bool {
        !id.is_empty() && !GENERATED_ID.is_match(id)
    }

    fn is_semantic_class(class: &str) -> bool {
        class.len() > 2
            && !class.chars().any(|c| c.is_ascii_digit())
            && !HASHED_CLASS.is_match(class)
            && !UTILITY_CLASS.is_match(class)
    }

    /// Explicit role attribute, else a tag/type heuristic.
    fn role_of(snapshot: &ElementSnapshot) -> String {
        if let Some(role) = snapshot.attr("role") {
            return role.to_string();
        }
        match snapshot.tag.as_str() {
            "a" => "link".to_string(),
            "button" => "button".to_string(),
            "select" => "listbox".to_string(),
            "textarea" => "textbox".to_string(),
            "input" => match snapshot.attr("type") {
                Some("checkbox") => "checkbox".to_string(),
                Some("radio") => "radio".to_string(),
                Some("range") => "slider".to_string(),
                Some("file") => "button".to_string(),
                Some("submit") | Some("button") => "button".to_string(),
                Some("search") => "searchbox".to_string(),
                _ => "textbox".to_string(),
            },
            "audio" | "video" => "media".to_string(),
            tag => tag.to_string(),
        }
    }

    fn purpose_of(snapshot: &ElementSnapshot) -> ElementPurpose {
        let ty = snapshot.attr("type").unwrap_or("");
        let name = snapshot.attr("name").unwrap_or("").to_lowercase();
        let text = snapshot
            .text
            .as_deref()
            .unwrap_or("")
            .to_lowercase();

        if ty == "search"
            || snapshot.attr("role") == Some("search")
            || ["q", "query", "search"].contains(&name.as_str())
        {
            return ElementPurpose::Search;
        }
        if ty == "password"
            || name.contains("password")
            || text.contains("sign in")
            || text.contains("log in")
        {
            return ElementPurpose::Auth;
        }
        if matches!(ty, "checkbox" | "radio") || snapshot.attr("role") == Some("switch") {
            return ElementPurpose::Toggle;
        }
        if ty == "submit" || (snapshot.form.is_some() && snapshot.tag == "button") {
            return ElementPurpose::Submission;
        }
        if snapshot.tag == "a" || snapshot.attr("role") == Some("link") {
            return ElementPurpose::Navigation;
        }
        if matches!(snapshot.tag.as_str(), "audio" | "video") {
            return ElementPurpose::Media;
        }
        ElementPurpose::General
    }

    /// Short human description. Non-textual icon elements borrow nearby
    /// sibling/parent text.
    fn describe(snapshot: &ElementSnapshot) -> String {
        let role = Self::role_of(snapshot);
        let text = snapshot
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or(snapshot.attr("aria-label"))
            .or(snapshot.nearby_text.as_deref().map(str::trim))
            .or(snapshot.attr("name"));
        match text {
            Some(text) => format!("\"{}\" {}", text, role),
            None => format!("unnamed {}", role),
        }
    }

    /// Whether button text matches the submit-keyword list.
    pub(crate) fn is_submit_text(text: &str) -> bool {
        let text = text.trim().to_lowercase();
        SUBMIT_KEYWORDS
            .iter()
            .any(|k| text == *k || text.starts_with(&format!("{} ", k)))
    }
}

impl Default for DescriptorBuilder {
    fn default() -> Self {
        Self::new(SelectorConfig::default())
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
