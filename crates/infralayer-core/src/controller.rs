//! The top-level state controller.
//!
//! [`MapStateController`] owns every piece of canonical state (visible layers, per-category
//! selections and enabled flags, style snapshots) and is the only writer to the rendering
//! engine. The control panel and the URL manager observe and change state exclusively through
//! it.
//!
//! Style-scoped work is gated on a two-state machine:
//!
//! - `AwaitingStyle`: mutations only touch canonical state and are recorded as pending.
//! - `Ready`: original predicates have been captured for the loaded style and every mutation is
//!   pushed to the engine immediately.
//!
//! The single edge from `AwaitingStyle` to `Ready` is [`MapStateController::handle_style_ready`],
//! which captures the snapshots and flushes everything once from canonical state. Snapshots are
//! only dropped by [`MapStateController::invalidate_style`] or by attaching an engine whose style
//! is still loading.

use crate::apply::{
    LayerUpdate, PlannedUpdate, effective_selection, plan_category, planned_for, write_plan,
};
use crate::compile::{CompiledFilter, compile};
use crate::config::ControllerConfig;
use crate::engine::{RenderEngine, Visibility};
use crate::options::{Category, FilterOption, PerCategory};
use crate::panel::{ControlPanel, StateObserver, StateView};
use crate::registry::{LayerRegistry, LayerSpec, VisibilitySet, same_members};
use crate::selection::SelectionSet;
use crate::snapshot::{StyleSnapshot, capture_style};
use crate::Result;
use indexmap::IndexSet;
use std::fmt;

/// Serialized form of an empty visible set. Layer ids never contain `,`, so this splits into
/// nothing but unknown ids and can never collide with the defaults' empty string.
const EMPTY_VISIBLE_SET: &str = ",";

/// Engine work recorded while the style is not ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingUpdate {
    Visibility,
    Filters(Category),
}

#[derive(Debug, Clone)]
enum StylePhase {
    AwaitingStyle,
    Ready(StyleSnapshot),
}

pub struct MapStateController<E> {
    registry: LayerRegistry,
    visible: VisibilitySet,
    selections: PerCategory<SelectionSet>,
    enabled: PerCategory<bool>,
    phase: StylePhase,
    pending: IndexSet<PendingUpdate>,
    engine: Option<E>,
    panel: Option<Box<dyn ControlPanel>>,
    observer: Option<Box<dyn StateObserver>>,
}

impl<E: fmt::Debug> fmt::Debug for MapStateController<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapStateController")
            .field("registry", &self.registry)
            .field("visible", &self.visible)
            .field("selections", &self.selections)
            .field("enabled", &self.enabled)
            .field("phase", &self.phase)
            .field("pending", &self.pending)
            .field("engine", &self.engine)
            .field("panel", &self.panel.is_some())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl<E: RenderEngine> MapStateController<E> {
    /// Builds a detached controller. Fails only on an invalid layer table.
    pub fn new(config: ControllerConfig) -> Result<Self> {
        let registry = LayerRegistry::new(config.layers)?;
        let visible = registry.default_visible().clone();
        Ok(Self {
            registry,
            visible,
            selections: config.selections.initial_selections(),
            enabled: config.selections.initial_enabled(),
            phase: StylePhase::AwaitingStyle,
            pending: IndexSet::new(),
            engine: None,
            panel: None,
            observer: None,
        })
    }

    pub fn set_panel(&mut self, panel: Box<dyn ControlPanel>) {
        self.panel = Some(panel);
    }

    pub fn set_observer(&mut self, observer: Box<dyn StateObserver>) {
        self.observer = Some(observer);
    }

    /// Attaches the rendering engine.
    ///
    /// If its style is already loaded the controller becomes ready right away; otherwise the host
    /// must call [`Self::handle_style_ready`] once the style finishes loading.
    ///
    /// Snapshots kept from a previous [`Self::detach`] are reused when the engine arrives with a
    /// loaded style, so reattaching the same engine never captures already-filtered predicates.
    /// Attaching an engine that loaded a different style requires [`Self::invalidate_style`]
    /// first.
    pub fn attach(&mut self, engine: E) {
        let ready = engine.is_style_ready();
        self.engine = Some(engine);
        if ready {
            self.handle_style_ready();
        } else {
            self.phase = StylePhase::AwaitingStyle;
            tracing::debug!("engine attached; awaiting style");
        }
        self.resync_panel();
    }

    /// Detaches and returns the engine. Canonical state and style snapshots are kept.
    pub fn detach(&mut self) -> Option<E> {
        self.engine.take()
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Direct engine access for host-side work (e.g. starting a style swap).
    ///
    /// Changing visibility or predicates through this handle bypasses the controller; the next
    /// flush overwrites such changes.
    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }

    /// Style-ready notification from the host.
    ///
    /// Captures every category's original predicates from the freshly loaded style, then pushes
    /// visibility and all filters from canonical state. Pending updates are cleared.
    ///
    /// A repeated notification for a style that is already ready keeps the existing snapshots
    /// and only flushes again.
    pub fn handle_style_ready(&mut self) {
        let Some(engine) = self.engine.as_ref() else {
            tracing::debug!("style ready without an attached engine; ignoring");
            return;
        };
        if !engine.is_style_ready() {
            tracing::debug!("style ready notification while engine is still loading; ignoring");
            return;
        }
        if let StylePhase::AwaitingStyle = self.phase {
            self.phase = StylePhase::Ready(capture_style(engine));
        } else {
            tracing::debug!("style already ready; keeping captured predicates");
        }
        let flushed = self.pending.len();
        self.pending.clear();
        tracing::debug!(flushed, "style ready; flushing state");
        self.propagate_visibility();
        self.apply_filters(&Category::ALL);
    }

    /// A new style started loading: snapshots are stale from now on.
    pub fn invalidate_style(&mut self) {
        if matches!(self.phase, StylePhase::Ready(_)) {
            tracing::debug!("style invalidated; awaiting reload");
        }
        self.phase = StylePhase::AwaitingStyle;
    }

    pub fn is_style_ready(&self) -> bool {
        matches!(self.phase, StylePhase::Ready(_))
            && self.engine.as_ref().is_some_and(|e| e.is_style_ready())
    }

    /// Updates waiting for the style, in the order they were first requested.
    ///
    /// This is a record of what changed, not a replay queue: readiness always flushes visibility
    /// and every category from canonical state regardless of which kinds are listed.
    pub fn pending_updates(&self) -> impl Iterator<Item = PendingUpdate> + '_ {
        self.pending.iter().copied()
    }

    /// Snapshots of the current style. Kept while detached; dropped once the style is invalidated.
    pub fn style_snapshot(&self) -> Option<&StyleSnapshot> {
        match &self.phase {
            StylePhase::Ready(snapshot) => Some(snapshot),
            StylePhase::AwaitingStyle => None,
        }
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn layers(&self) -> &[LayerSpec] {
        self.registry.specs()
    }

    pub fn visible_layers(&self) -> impl Iterator<Item = &str> {
        self.visible.iter().map(String::as_str)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    pub fn selection(&self, category: Category) -> &SelectionSet {
        &self.selections[category]
    }

    pub fn category_enabled(&self, category: Category) -> bool {
        self.enabled[category]
    }

    pub fn options(&self, category: Category) -> &'static [FilterOption] {
        category.options()
    }

    /// The compiled filter a category currently applies (empty when disabled).
    pub fn compiled_filter(&self, category: Category) -> CompiledFilter {
        compile(&effective_selection(
            &self.selections[category],
            self.enabled[category],
        ))
    }

    pub fn state_view(&self) -> StateView<'_> {
        StateView {
            layers: self.registry.specs(),
            visible: &self.visible,
            selections: &self.selections,
            enabled: &self.enabled,
        }
    }

    /// Shows or hides an abstract layer. Showing a radio-group member hides its siblings first.
    /// Unknown ids are ignored.
    pub fn set_visibility(&mut self, id: &str, visible: bool) {
        if !self.registry.contains(id) {
            tracing::debug!(id, "ignoring visibility change for unknown layer");
            return;
        }
        if visible {
            let siblings: Vec<String> = self
                .registry
                .group_siblings(id)
                .map(|s| s.id.clone())
                .collect();
            for sibling in &siblings {
                self.visible.shift_remove(sibling);
            }
            self.visible.insert(id.to_string());
        } else {
            self.visible.shift_remove(id);
        }
        self.sync_visibility();
        self.notify();
    }

    /// Selects or deselects one filter option. Unknown option ids are ignored.
    pub fn set_category_selection(&mut self, category: Category, id: &str, selected: bool) {
        if category.option(id).is_none() {
            tracing::debug!(%category, id, "ignoring unknown filter option");
            return;
        }
        let selection = &mut self.selections[category];
        if selected {
            selection.insert(id);
        } else {
            selection.remove(id);
        }
        self.sync_filters(category);
        self.notify();
    }

    /// Enables or disables a whole category. The selection itself is kept as-is, so enabling
    /// again restores it.
    pub fn set_category_enabled(&mut self, category: Category, enabled: bool) {
        self.enabled[category] = enabled;
        self.sync_filters(category);
        self.notify();
    }

    /// Visible ids, sorted and comma-joined; empty when they equal the defaults.
    ///
    /// An empty visible set (with non-empty defaults) serializes to `","`.
    pub fn get_serialized_state(&self) -> String {
        if same_members(&self.visible, self.registry.default_visible()) {
            return String::new();
        }
        if self.visible.is_empty() {
            return EMPTY_VISIBLE_SET.to_string();
        }
        let mut ids: Vec<&str> = self.visible.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids.join(",")
    }

    /// Replaces the visible set from a serialized string (empty means defaults).
    ///
    /// Unknown ids are dropped. The engine is updated when ready and the panel is resynced; the
    /// observer is not notified, since the caller is where the string came from.
    pub fn apply_serialized_state(&mut self, serialized: &str) {
        self.visible = if serialized.is_empty() {
            self.registry.default_visible().clone()
        } else {
            self.registry.sanitize(serialized.split(','))
        };
        self.sync_visibility();
        self.resync_panel();
    }

    /// Hides, in a style document that has not been handed to a map yet, every layer whose
    /// abstract layer is currently hidden.
    pub fn set_initial_visibility(&self, style: &mut serde_json::Value) {
        self.registry.hide_in_style(style, &self.visible);
    }

    fn sync_visibility(&mut self) {
        if self.is_style_ready() {
            self.propagate_visibility();
        } else {
            self.pending.insert(PendingUpdate::Visibility);
        }
    }

    fn sync_filters(&mut self, category: Category) {
        if self.is_style_ready() {
            self.apply_filters(&[category]);
        } else {
            self.pending.insert(PendingUpdate::Filters(category));
        }
    }

    /// Writes the visibility of every concrete layer some spec claims. A layer a category
    /// currently hides stays hidden even when its abstract layer is visible.
    fn propagate_visibility(&mut self) {
        let (Some(engine), StylePhase::Ready(snapshot)) = (self.engine.as_mut(), &self.phase)
        else {
            return;
        };
        let plans = category_plans(snapshot, &self.selections, &self.enabled);
        let layer_ids = engine.layer_ids();
        let plan = self
            .registry
            .visibility_plan(layer_ids.iter().map(String::as_str), &self.visible);
        for (layer, visibility) in plan {
            let category_hides = plans
                .iter()
                .any(|(_, p)| matches!(planned_for(p, &layer), Some(LayerUpdate::Hide)));
            let visibility = if category_hides {
                Visibility::None
            } else {
                visibility
            };
            tracing::trace!(layer = layer.as_str(), visibility = visibility.as_str(), "propagate");
            engine.set_visibility(&layer, visibility);
        }
    }

    fn apply_filters(&mut self, categories: &[Category]) {
        let (Some(engine), StylePhase::Ready(snapshot)) = (self.engine.as_mut(), &self.phase)
        else {
            return;
        };
        let registry = &self.registry;
        let visible = &self.visible;
        for &category in categories {
            let selection =
                effective_selection(&self.selections[category], self.enabled[category]);
            let plan = plan_category(&snapshot[category], &selection);
            tracing::debug!(%category, layers = plan.len(), "applying category filter");
            write_plan(&mut *engine, &plan, |layer| {
                registry
                    .resolve(layer)
                    .is_none_or(|spec| visible.contains(&spec.id))
            });
        }
    }

    fn notify(&mut self) {
        if self.observer.is_none() {
            return;
        }
        let serialized = self.get_serialized_state();
        if let Some(observer) = self.observer.as_mut() {
            observer.state_changed(&serialized);
        }
    }

    fn resync_panel(&mut self) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        let view = StateView {
            layers: self.registry.specs(),
            visible: &self.visible,
            selections: &self.selections,
            enabled: &self.enabled,
        };
        panel.resync(&view);
    }
}

fn category_plans(
    snapshot: &StyleSnapshot,
    selections: &PerCategory<SelectionSet>,
    enabled: &PerCategory<bool>,
) -> PerCategory<Vec<PlannedUpdate>> {
    PerCategory::from_fn(|category| {
        plan_category(
            &snapshot[category],
            &effective_selection(&selections[category], enabled[category]),
        )
    })
}
