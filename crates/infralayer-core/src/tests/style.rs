use crate::*;
use serde_json::json;

#[test]
fn reads_visibility_and_filters_from_the_document() {
    let doc = StyleDocument::loaded(json!({ "layers": [
        { "id": "a", "layout": { "visibility": "none" } },
        { "id": "b", "filter": ["has", "x"] },
        { "id": "c", "filter": null },
    ]}));
    assert_eq!(doc.layer_ids(), ["a", "b", "c"]);
    assert_eq!(doc.visibility("a"), Some(Visibility::None));
    assert_eq!(doc.visibility("b"), Some(Visibility::Visible));
    assert_eq!(doc.visibility("missing"), None);
    assert_eq!(
        doc.predicate("b"),
        Some(Predicate::from_value(json!(["has", "x"])))
    );
    assert_eq!(doc.predicate("c"), None);
    assert!(!doc.layer_exists("missing"));
}

#[test]
fn writes_land_where_a_map_reads_them() {
    let mut doc = StyleDocument::loaded(json!({ "layers": [
        { "id": "a", "layout": "bogus", "filter": ["has", "x"] },
    ]}));
    doc.set_visibility("a", Visibility::None);
    doc.set_predicate("a", None);
    doc.set_visibility("missing", Visibility::None);
    assert_eq!(
        doc.as_value(),
        &json!({ "layers": [{ "id": "a", "layout": { "visibility": "none" } }] })
    );

    let p = Predicate::from_value(json!(["==", ["get", "k"], 1]));
    doc.set_predicate("a", Some(&p));
    assert_eq!(doc.predicate("a"), Some(p));
}

#[test]
fn reload_resets_readiness() {
    let mut doc = StyleDocument::loaded(json!({ "layers": [{ "id": "a" }] }));
    assert!(doc.is_style_ready());
    doc.reload(json!({ "layers": [] }));
    assert!(!doc.is_style_ready());
    assert!(doc.layer_ids().is_empty());
    doc.mark_ready();
    assert!(doc.is_style_ready());
}

#[test]
fn style_without_layers_is_empty() {
    let doc = StyleDocument::loading(json!({ "version": 8 }));
    assert!(doc.layer_ids().is_empty());
    assert!(!doc.is_style_ready());
}
