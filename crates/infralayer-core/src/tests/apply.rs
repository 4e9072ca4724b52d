use super::support::{EngineWrite, RecordingEngine, fixture_style, substation_base};
use crate::apply::*;
use crate::compile::compile;
use crate::*;
use serde_json::json;

fn snapshot(engine: &RecordingEngine, category: Category) -> FilterSnapshot {
    FilterSnapshot::capture(engine, category)
}

#[test]
fn snapshot_records_only_layers_in_the_style() {
    let engine = RecordingEngine::loaded(fixture_style());
    let lines = snapshot(&engine, Category::PowerLines);
    let layers: Vec<&str> = lines.filtered().map(|(l, _)| l).collect();
    assert_eq!(layers, ["power_line_case", "power_line_1", "power_line_label"]);
    assert!(!lines.contains("power_line_ref"));

    let plants = snapshot(&engine, Category::Plants);
    assert_eq!(plants.toggled(), ["power_solar_panel", "power_wind_turbine"]);
    assert_eq!(
        plants.original("power_plant_outline").map(Predicate::as_value),
        Some(&json!(["!", ["has", "construction"]]))
    );
    assert_eq!(plants.original("power_plant"), None);
}

#[test]
fn final_predicate_nests_the_original() {
    let original = Predicate::from_value(substation_base());
    let filter = Predicate::from_value(json!(["in", ["get", "substation"], ["literal", ["traction"]]]));
    let update = final_predicate(Some(&original), &CompiledFilter::Predicate(filter.clone()));
    assert_eq!(
        update,
        LayerUpdate::Filter(Some(Predicate::from_value(json!([
            "all",
            substation_base(),
            filter.as_value()
        ]))))
    );

    assert_eq!(
        final_predicate(None, &CompiledFilter::Predicate(filter.clone())),
        LayerUpdate::Filter(Some(filter))
    );
    assert_eq!(
        final_predicate(Some(&original), &CompiledFilter::Unrestricted),
        LayerUpdate::Filter(Some(original.clone()))
    );
    assert_eq!(
        final_predicate(Some(&original), &CompiledFilter::MatchNothing),
        LayerUpdate::Hide
    );
}

#[test]
fn applying_twice_yields_the_same_predicates() {
    let mut engine = RecordingEngine::loaded(fixture_style());
    let snap = snapshot(&engine, Category::Substations);
    let selection = SelectionSet::from_ids(Category::Substations, ["traction"]);

    apply_category(&mut engine, &snap, &selection);
    let first = engine.filter("power_substation");
    apply_category(&mut engine, &snap, &selection);
    let second = engine.filter("power_substation");

    assert_eq!(first, second);
    let expected = final_predicate(snap.original("power_substation"), &compile(&selection));
    let LayerUpdate::Filter(Some(expected)) = expected else {
        panic!("expected a filter update");
    };
    assert_eq!(first, Some(expected.into_value()));
}

#[test]
fn unrestricted_restores_the_original_predicate() {
    let mut engine = RecordingEngine::loaded(fixture_style());
    let snap = snapshot(&engine, Category::Substations);

    apply_category(
        &mut engine,
        &snap,
        &SelectionSet::from_ids(Category::Substations, ["other"]),
    );
    assert_ne!(engine.filter("power_substation"), Some(substation_base()));

    apply_category(&mut engine, &snap, &SelectionSet::all(Category::Substations));
    assert_eq!(engine.filter("power_substation"), Some(substation_base()));
    assert_eq!(engine.filter("power_substation_point"), None);
    assert!(engine.shown("power_substation"));
}

#[test]
fn match_nothing_hides_without_touching_predicates() {
    let mut engine = RecordingEngine::loaded(fixture_style());
    let snap = snapshot(&engine, Category::PowerLines);

    apply_category(&mut engine, &snap, &SelectionSet::empty(Category::PowerLines));

    for layer in ["power_line_case", "power_line_1", "power_line_label"] {
        assert!(!engine.shown(layer), "{layer}");
        assert_eq!(engine.predicate_writes(layer), 0, "{layer}");
        assert_eq!(engine.visibility_writes(layer), 1, "{layer}");
    }
    assert_eq!(
        engine.filter("power_line_case"),
        Some(json!(["==", ["get", "tunnel"], false]))
    );
}

#[test]
fn absent_layers_are_never_written() {
    let mut engine = RecordingEngine::loaded(fixture_style());
    let snap = snapshot(&engine, Category::PowerLines);
    apply_category(&mut engine, &snap, &SelectionSet::all(Category::PowerLines));

    assert_eq!(engine.visibility_writes("power_line_ref"), 0);
    assert_eq!(engine.predicate_writes("power_line_ref"), 0);
    assert!(engine.writes.iter().all(|w| match w {
        EngineWrite::Visibility(l, _) | EngineWrite::Predicate(l, _) => snap.contains(l),
    }));
}

#[test]
fn source_specific_layers_follow_their_option() {
    let mut engine = RecordingEngine::loaded(fixture_style());
    let snap = snapshot(&engine, Category::Plants);

    apply_category(
        &mut engine,
        &snap,
        &SelectionSet::from_ids(Category::Plants, ["wind"]),
    );
    assert!(engine.shown("power_wind_turbine"));
    assert!(!engine.shown("power_solar_panel"));
    assert_eq!(engine.predicate_writes("power_wind_turbine"), 0);

    apply_category(
        &mut engine,
        &snap,
        &SelectionSet::from_ids(Category::Plants, ["solar"]),
    );
    assert!(!engine.shown("power_wind_turbine"));
    assert!(engine.shown("power_solar_panel"));
}

#[test]
fn parent_veto_hides_but_still_writes_predicates() {
    let mut engine = RecordingEngine::loaded(fixture_style());
    let snap = snapshot(&engine, Category::Plants);
    let plan = plan_category(&snap, &SelectionSet::from_ids(Category::Plants, ["coal"]));

    write_plan(&mut engine, &plan, |_| false);

    assert!(!engine.shown("power_plant"));
    assert!(engine.filter("power_plant").is_some());
    assert_eq!(engine.visibility_writes("power_plant"), 1);
    assert_eq!(engine.predicate_writes("power_plant"), 1);
}

#[test]
fn disabled_category_applies_an_empty_selection() {
    let selection = SelectionSet::all(Category::Substations);
    assert!(effective_selection(&selection, false).is_empty());
    assert_eq!(effective_selection(&selection, true), selection);
}

#[test]
fn plan_lists_filtered_layers_before_toggled_ones() {
    let snap = FilterSnapshot::from_originals([("power_plant", None)])
        .with_toggled(["power_solar_panel"]);
    let plan = plan_category(&snap, &SelectionSet::all(Category::Plants));
    let layers: Vec<&str> = plan.iter().map(|p| p.layer).collect();
    assert_eq!(layers, ["power_plant", "power_solar_panel"]);
    assert_eq!(planned_for(&plan, "power_solar_panel"), Some(&LayerUpdate::Show));
    assert_eq!(planned_for(&plan, "power_wind_turbine"), None);
}
