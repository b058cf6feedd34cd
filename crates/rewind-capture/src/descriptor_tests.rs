use std::collections::HashMap;

use rewind_protocols::{ElementSnapshot, Rect, SelectorKind};

use super::*;

fn builder() -> DescriptorBuilder {
    DescriptorBuilder::default()
}

fn snapshot(tag: &str) -> ElementSnapshot {
    ElementSnapshot {
        tag: tag.to_string(),
        rect: Rect::new(0.0, 0.0, 100.0, 30.0),
        opacity: 1.0,
        ..Default::default()
    }
}

fn with_attrs(mut s: ElementSnapshot, attrs: &[(&str, &str)]) -> ElementSnapshot {
    s.attributes = attrs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<HashMap<_, _>>();
    s
}

#[test]
fn test_stable_id_is_primary() {
    let mut s = snapshot("button");
    s.id = Some("checkout".to_string());
    s.text = Some("Buy".to_string());

    let d = builder().build(&s);
    let primary = d.primary().unwrap();
    assert_eq!(primary.kind, SelectorKind::Id);
    assert_eq!(primary.selector, "#checkout");
    assert_eq!(primary.score, 100);
}

#[test]
fn test_generated_ids_rejected() {
    for id in ["ember123", "react-select-9", ":r1a:", "a3f8c9e2-4b7d", "12abc", "field9481"] {
        let mut s = snapshot("input");
        s.id = Some(id.to_string());
        let d = builder().build(&s);
        assert!(
            d.strategies().iter().all(|st| st.kind != SelectorKind::Id),
            "id {:?} should be rejected",
            id
        );
    }
}

#[test]
fn test_test_attribute_outranks_form_field() {
    let s = with_attrs(
        snapshot("input"),
        &[("data-testid", "email-input"), ("name", "email"), ("type", "text")],
    );
    let d = builder().build(&s);
    assert_eq!(d.primary().unwrap().selector, "[data-testid=\"email-input\"]");
    assert_eq!(d.primary().unwrap().score, 95);
}

#[test]
fn test_form_field_selector_includes_type() {
    let s = with_attrs(snapshot("input"), &[("name", "q"), ("type", "search")]);
    let d = builder().build(&s);
    let form = d
        .strategies()
        .iter()
        .find(|st| st.kind == SelectorKind::FormField)
        .unwrap();
    assert_eq!(form.selector, "input[name=\"q\"][type=\"search\"]");
}

#[test]
fn test_link_exact_path_preferred_over_hostname() {
    let mut exact = snapshot("a");
    exact.href = Some("https://docs.example/guide/intro".to_string());
    let d = builder().build(&exact);
    let link = d
        .strategies()
        .iter()
        .find(|st| st.kind == SelectorKind::LinkHref)
        .unwrap();
    assert_eq!(link.selector, "a[href=\"https://docs.example/guide/intro\"]");
    assert_eq!(link.score, 75);

    let mut bare = snapshot("a");
    bare.href = Some("https://docs.example/".to_string());
    let d = builder().build(&bare);
    let link = d
        .strategies()
        .iter()
        .find(|st| st.kind == SelectorKind::LinkHref)
        .unwrap();
    assert_eq!(link.selector, "a[href*=\"docs.example\"]");
    assert_eq!(link.score, 65);
    assert_eq!(link.note.as_deref(), Some("hostname only"));
}

#[test]
fn test_visible_text_only_for_buttons_and_links() {
    let mut button = snapshot("button");
    button.text = Some("Submit order".to_string());
    let d = builder().build(&button);
    assert!(d
        .strategies()
        .iter()
        .any(|st| st.selector == "button:text(\"Submit order\")"));

    let mut div = snapshot("div");
    div.text = Some("Submit order".to_string());
    let d = builder().build(&div);
    assert!(d.strategies().iter().all(|st| st.kind != SelectorKind::VisibleText));
}

#[test]
fn test_long_text_not_used_as_selector() {
    let mut s = snapshot("a");
    s.text = Some("a".repeat(100));
    let d = builder().build(&s);
    assert!(d.strategies().iter().all(|st| st.kind != SelectorKind::VisibleText));
}

#[test]
fn test_hashed_and_utility_classes_filtered() {
    let mut s = snapshot("button");
    s.classes = vec![
        "css-1q2w3e".to_string(),
        "mt-4".to_string(),
        "bg-blue".to_string(),
        "checkout-button".to_string(),
        "a8f3c2e901".to_string(),
    ];
    let d = builder().build(&s);
    let class = d
        .strategies()
        .iter()
        .find(|st| st.kind == SelectorKind::SemanticClass)
        .unwrap();
    assert_eq!(class.selector, "button.checkout-button");
}

#[test]
fn test_all_generated_classes_yield_no_class_strategy() {
    let mut s = snapshot("div");
    s.classes = vec!["css-abc123".to_string(), "p-2".to_string()];
    let d = builder().build(&s);
    assert!(d.strategies().iter().all(|st| st.kind != SelectorKind::SemanticClass));
}

#[test]
fn test_structural_fallback_always_present_and_capped() {
    let mut s = snapshot("button");
    s.ancestors = vec![
        "form".to_string(),
        "div".to_string(),
        "section".to_string(),
        "main".to_string(),
        "body".to_string(),
    ];
    let d = builder().build(&s);
    let structural = d
        .strategies()
        .iter()
        .find(|st| st.kind == SelectorKind::Structural)
        .unwrap();
    // Depth capped at 3 ancestors, outermost first.
    assert_eq!(structural.selector, "section > div > form > button");
    assert_eq!(structural.score, 20);
}

#[test]
fn test_scores_are_non_increasing() {
    let mut s = with_attrs(
        snapshot("a"),
        &[("data-testid", "nav-home"), ("aria-label", "Home")],
    );
    s.id = Some("home-link".to_string());
    s.href = Some("/home".to_string());
    s.text = Some("Home".to_string());
    s.classes = vec!["nav-link".to_string()];
    s.ancestors = vec!["nav".to_string()];

    let d = builder().build(&s);
    let scores: Vec<u8> = d.strategies().iter().map(|st| st.score).collect();
    assert!(scores.len() >= 6);
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(d.primary().unwrap().kind, SelectorKind::Id);
}

#[test]
fn test_retuned_score_table_reorders_ladder() {
    let mut config = rewind_config::SelectorConfig::default();
    config.id_score = 10;
    config.semantic_class_score = 90;

    let mut s = snapshot("button");
    s.id = Some("save".to_string());
    s.classes = vec!["save-button".to_string()];

    let d = DescriptorBuilder::new(config).build(&s);
    assert_eq!(d.primary().unwrap().kind, SelectorKind::SemanticClass);
}

#[test]
fn test_role_heuristics() {
    let checkbox = with_attrs(snapshot("input"), &[("type", "checkbox")]);
    assert_eq!(builder().build(&checkbox).role.as_deref(), Some("checkbox"));

    let slider = with_attrs(snapshot("input"), &[("type", "range")]);
    assert_eq!(builder().build(&slider).role.as_deref(), Some("slider"));

    let explicit = with_attrs(snapshot("div"), &[("role", "tab")]);
    assert_eq!(builder().build(&explicit).role.as_deref(), Some("tab"));
}

#[test]
fn test_purpose_inference() {
    use rewind_protocols::ElementPurpose;

    let search = with_attrs(snapshot("input"), &[("type", "search")]);
    assert_eq!(builder().build(&search).purpose, ElementPurpose::Search);

    let password = with_attrs(snapshot("input"), &[("type", "password"), ("name", "password")]);
    assert_eq!(builder().build(&password).purpose, ElementPurpose::Auth);

    let toggle = with_attrs(snapshot("input"), &[("type", "checkbox")]);
    assert_eq!(builder().build(&toggle).purpose, ElementPurpose::Toggle);

    let mut link = snapshot("a");
    link.href = Some("/docs".to_string());
    assert_eq!(builder().build(&link).purpose, ElementPurpose::Navigation);
}

#[test]
fn test_icon_element_borrows_nearby_text() {
    let mut s = snapshot("button");
    s.nearby_text = Some("Delete item".to_string());
    let d = builder().build(&s);
    assert_eq!(d.description, "\"Delete item\" button");
}

#[test]
fn test_description_with_text() {
    let mut s = snapshot("button");
    s.text = Some("Save".to_string());
    assert_eq!(builder().build(&s).description, "\"Save\" button");
}

#[test]
fn test_invisible_element_flagged() {
    let mut s = snapshot("button");
    s.hidden = true;
    assert!(!builder().build(&s).visible);
}
