use crate::options::{Category, FilterOption};
use rustc_hash::FxHashSet;

/// The selected option ids of one category.
///
/// Ids are stored as the option table's own `'static` strings, so the set can only ever contain
/// ids the category defines. Unknown ids are rejected at insertion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    category: Category,
    selected: FxHashSet<&'static str>,
}

impl SelectionSet {
    pub fn empty(category: Category) -> Self {
        Self {
            category,
            selected: FxHashSet::default(),
        }
    }

    /// Every option of the category selected (the session default).
    pub fn all(category: Category) -> Self {
        Self {
            category,
            selected: category.options().iter().map(|o| o.id).collect(),
        }
    }

    /// Builds a selection from ids, silently dropping ids the category does not define.
    pub fn from_ids<I, S>(category: Category, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Self::empty(category);
        for id in ids {
            out.insert(id.as_ref());
        }
        out
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Whether every option of the category is selected.
    pub fn is_full(&self) -> bool {
        self.category
            .options()
            .iter()
            .all(|o| self.selected.contains(o.id))
    }

    /// Inserts `id`. Returns `false` when the id is unknown or already selected.
    pub fn insert(&mut self, id: &str) -> bool {
        let Some(option) = self.category.option(id) else {
            return false;
        };
        self.selected.insert(option.id)
    }

    /// Removes `id`. Returns `false` when it was not selected.
    pub fn remove(&mut self, id: &str) -> bool {
        self.selected.remove(id)
    }

    /// Selected options in option-table order.
    pub fn options(&self) -> impl Iterator<Item = &'static FilterOption> + '_ {
        self.category
            .options()
            .iter()
            .filter(|o| self.selected.contains(o.id))
    }

    /// Selected ids in option-table order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.options().map(|o| o.id).collect()
    }
}
