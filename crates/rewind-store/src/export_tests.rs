use rewind_protocols::{ActionType, PageContext, RecordingSession, SemanticAction};

use super::*;

fn session() -> RecordingSession {
    let ctx = |url: &str| PageContext {
        url: url.to_string(),
        ..Default::default()
    };
    let mut s = RecordingSession::new("s-1", "https://shop.example/");
    s.append(
        SemanticAction::new(ActionType::Navigate, 100, ctx("https://shop.example/"))
            .with_value("https://shop.example/cart"),
    )
    .unwrap();
    s.append(
        SemanticAction::new(ActionType::TextEntry, 200, ctx("https://shop.example/cart"))
            .with_value("2")
            .with_intent("search"),
    )
    .unwrap();
    s.append(SemanticAction::new(
        ActionType::PageLoad,
        300,
        ctx("https://shop.example/checkout"),
    ))
    .unwrap();
    s.close();
    s
}

#[test]
fn test_export_orders_and_numbers_steps() {
    let export = SessionExport::from_session(&session(), 50);
    assert_eq!(export.session_id, "s-1");
    assert_eq!(export.steps.len(), 3);
    assert_eq!(export.steps[0].seq, 1);
    assert_eq!(export.steps[0].line, "Navigated to https://shop.example/cart");
    assert_eq!(export.steps[1].intent.as_deref(), Some("search"));
    assert!(!export.truncated);
}

#[test]
fn test_export_bounded_by_max_steps() {
    let export = SessionExport::from_session(&session(), 2);
    assert_eq!(export.steps.len(), 2);
    assert!(export.truncated);
    assert!(export.to_text().contains("further steps omitted"));
}

#[test]
fn test_export_collects_distinct_pages() {
    let export = SessionExport::from_session(&session(), 50);
    assert_eq!(
        export.pages_visited,
        vec![
            "https://shop.example/".to_string(),
            "https://shop.example/cart".to_string(),
            "https://shop.example/checkout".to_string(),
        ]
    );
}

#[test]
fn test_text_rendering_is_numbered() {
    let text = SessionExport::from_session(&session(), 50).to_text();
    assert!(text.starts_with("Recorded session s-1"));
    assert!(text.contains("1. Navigated to https://shop.example/cart"));
    assert!(text.contains("3. Loaded https://shop.example/checkout"));
    assert!(text.contains("- https://shop.example/checkout"));
}

#[test]
fn test_export_serializes_to_json() {
    let export = SessionExport::from_session(&session(), 50);
    let json = serde_json::to_value(&export).unwrap();
    assert_eq!(json["session_id"], "s-1");
    assert_eq!(json["steps"][0]["action"], "navigate");
    assert!(json["truncated"].as_bool() == Some(false));
}
