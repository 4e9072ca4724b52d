//! Collaborators on the UI side of the controller: the control panel and the URL/history
//! manager.

use crate::options::{Category, FilterOption, PerCategory};
use crate::registry::{LayerSpec, VisibilitySet};
use crate::selection::SelectionSet;

/// Read-only view of the controller's canonical state, handed to the panel on resync.
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
    pub(crate) layers: &'a [LayerSpec],
    pub(crate) visible: &'a VisibilitySet,
    pub(crate) selections: &'a PerCategory<SelectionSet>,
    pub(crate) enabled: &'a PerCategory<bool>,
}

impl<'a> StateView<'a> {
    pub fn layers(&self) -> &'a [LayerSpec] {
        self.layers
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    pub fn visible_layers(&self) -> impl Iterator<Item = &'a str> {
        self.visible.iter().map(String::as_str)
    }

    pub fn selection(&self, category: Category) -> &'a SelectionSet {
        &self.selections[category]
    }

    pub fn is_selected(&self, category: Category, id: &str) -> bool {
        self.selections[category].contains(id)
    }

    pub fn category_enabled(&self, category: Category) -> bool {
        self.enabled[category]
    }

    /// The panel's "hide category" checkbox is the inverse of the enabled flag.
    pub fn category_hidden(&self, category: Category) -> bool {
        !self.enabled[category]
    }

    pub fn options(&self, category: Category) -> &'static [FilterOption] {
        category.options()
    }
}

/// The interactive control panel.
///
/// The panel drives the controller through its mutators; the controller calls back into
/// [`ControlPanel::resync`] whenever state changed by some other path (URL load, attach).
pub trait ControlPanel {
    fn resync(&mut self, state: &StateView<'_>);
}

/// The URL/history manager that persists the serialized state.
pub trait StateObserver {
    fn state_changed(&mut self, serialized: &str);
}

impl<F: FnMut(&str)> StateObserver for F {
    fn state_changed(&mut self, serialized: &str) {
        self(serialized);
    }
}
