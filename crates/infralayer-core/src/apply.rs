//! Per-category filter application.
//!
//! [`plan_category`] is a pure function of a snapshot and a selection; writing the plan to an
//! engine is a separate step. Re-running the same plan is therefore idempotent: predicates are
//! always rebuilt from the snapshot, never from whatever the engine currently holds.

use crate::compile::{CompiledFilter, compile};
use crate::engine::{RenderEngine, Visibility};
use crate::predicate::Predicate;
use crate::selection::SelectionSet;
use crate::snapshot::FilterSnapshot;

/// What one concrete layer should look like after a category is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerUpdate {
    /// Hide the layer; its predicate is left alone.
    Hide,
    /// Show the layer without touching its predicate.
    Show,
    /// Show the layer with this predicate (`None` clears it).
    Filter(Option<Predicate>),
}

impl LayerUpdate {
    pub fn is_shown(&self) -> bool {
        !matches!(self, Self::Hide)
    }
}

/// A planned update for one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedUpdate {
    pub layer: &'static str,
    pub update: LayerUpdate,
}

/// Final predicate for one layer: the conjunction of its original with the compiled filter.
pub fn final_predicate(original: Option<&Predicate>, compiled: &CompiledFilter) -> LayerUpdate {
    match compiled {
        CompiledFilter::MatchNothing => LayerUpdate::Hide,
        CompiledFilter::Unrestricted => LayerUpdate::Filter(original.cloned()),
        CompiledFilter::Predicate(p) => {
            LayerUpdate::Filter(Some(Predicate::and_base(original, p)))
        }
    }
}

/// Plans every layer the category governs that exists in the snapshot's style.
///
/// `selection` is the effective selection: callers pass an empty one when the category is
/// disabled.
pub fn plan_category(snapshot: &FilterSnapshot, selection: &SelectionSet) -> Vec<PlannedUpdate> {
    let category = selection.category();
    let compiled = compile(selection);

    let mut out = Vec::new();
    for (layer, original) in snapshot.filtered() {
        out.push(PlannedUpdate {
            layer,
            update: final_predicate(original, &compiled),
        });
    }
    for toggled in category.toggled_layers() {
        if !snapshot.toggled().contains(&toggled.layer) {
            continue;
        }
        let update = if selection.contains(toggled.option) {
            LayerUpdate::Show
        } else {
            LayerUpdate::Hide
        };
        out.push(PlannedUpdate {
            layer: toggled.layer,
            update,
        });
    }
    out
}

/// Writes a plan: one visibility write per layer, one predicate write for filtered layers.
///
/// `parent_visible` lets the caller veto visibility (e.g. when the abstract layer that owns the
/// concrete layer is hidden). Predicates are still written in that case so that showing the
/// parent later needs no further filter work.
pub fn write_plan(
    engine: &mut impl RenderEngine,
    plan: &[PlannedUpdate],
    mut parent_visible: impl FnMut(&str) -> bool,
) {
    for planned in plan {
        let layer = planned.layer;
        let shown = planned.update.is_shown() && parent_visible(layer);
        tracing::trace!(layer, shown, "apply category filter");
        engine.set_visibility(layer, Visibility::from_shown(shown));
        if let LayerUpdate::Filter(predicate) = &planned.update {
            engine.set_predicate(layer, predicate.as_ref());
        }
    }
}

/// Plans and writes one category with no parent veto.
pub fn apply_category(
    engine: &mut impl RenderEngine,
    snapshot: &FilterSnapshot,
    selection: &SelectionSet,
) {
    let plan = plan_category(snapshot, selection);
    write_plan(engine, &plan, |_| true);
}

/// The selection a category is applied with: the stored one, or nothing when disabled.
pub fn effective_selection(selection: &SelectionSet, enabled: bool) -> SelectionSet {
    if enabled {
        selection.clone()
    } else {
        SelectionSet::empty(selection.category())
    }
}

/// The planned update for `layer`, if the plan covers it.
pub fn planned_for<'a>(plan: &'a [PlannedUpdate], layer: &str) -> Option<&'a LayerUpdate> {
    plan.iter().find(|p| p.layer == layer).map(|p| &p.update)
}

