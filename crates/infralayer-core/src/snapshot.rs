use crate::engine::RenderEngine;
use crate::options::{Category, PerCategory};
use crate::predicate::Predicate;
use indexmap::IndexMap;

/// The predicates a category's layers carried before any category filter was applied.
///
/// Captured once per loaded style and never mutated afterwards. Layers missing from the style
/// are not recorded, which is how the applier knows to skip them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSnapshot {
    originals: IndexMap<&'static str, Option<Predicate>>,
    toggled: Vec<&'static str>,
}

impl FilterSnapshot {
    pub fn capture(engine: &impl RenderEngine, category: Category) -> Self {
        let mut originals = IndexMap::new();
        for &layer in category.filtered_layers() {
            if engine.layer_exists(layer) {
                originals.insert(layer, engine.predicate(layer));
            }
        }
        let toggled = category
            .toggled_layers()
            .iter()
            .map(|t| t.layer)
            .filter(|layer| engine.layer_exists(layer))
            .collect();
        Self { originals, toggled }
    }

    /// Builds a snapshot directly, e.g. for planning against a style that is not loaded.
    pub fn from_originals(
        originals: impl IntoIterator<Item = (&'static str, Option<Predicate>)>,
    ) -> Self {
        Self {
            originals: originals.into_iter().collect(),
            toggled: Vec::new(),
        }
    }

    pub fn with_toggled(mut self, layers: impl IntoIterator<Item = &'static str>) -> Self {
        self.toggled.extend(layers);
        self
    }

    pub fn contains(&self, layer: &str) -> bool {
        self.originals.contains_key(layer) || self.toggled.iter().any(|l| *l == layer)
    }

    /// The layer's own predicate. `None` both for "had none" and for "not in the style".
    pub fn original(&self, layer: &str) -> Option<&Predicate> {
        self.originals.get(layer)?.as_ref()
    }

    /// Filtered layers present in the style, with their originals, in declaration order.
    pub fn filtered(&self) -> impl Iterator<Item = (&'static str, Option<&Predicate>)> + '_ {
        self.originals.iter().map(|(layer, p)| (*layer, p.as_ref()))
    }

    /// Toggle-only layers present in the style.
    pub fn toggled(&self) -> &[&'static str] {
        &self.toggled
    }
}

/// The three category snapshots of one loaded style.
pub type StyleSnapshot = PerCategory<FilterSnapshot>;

pub fn capture_style(engine: &impl RenderEngine) -> StyleSnapshot {
    PerCategory::from_fn(|category| FilterSnapshot::capture(engine, category))
}
