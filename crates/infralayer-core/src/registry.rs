//! Abstract layer registry: specs, radio groups and concrete-layer resolution.

use crate::engine::Visibility;
use crate::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One controllable layer group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSpec {
    /// Short abstract id, used in the serialized state.
    pub id: String,
    /// Display text or translation key; the core never interprets it.
    pub title: String,
    /// Concrete layers whose id starts with this prefix belong to this spec.
    pub prefix: String,
    /// Radio group; at most one member of a group is visible at a time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub default_visible: bool,
}

impl LayerSpec {
    pub fn new(id: &str, title: &str, prefix: &str, default_visible: bool) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            prefix: prefix.to_string(),
            group: None,
            default_visible,
        }
    }

    pub fn in_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }
}

/// Insertion-ordered set of visible abstract ids.
pub type VisibilitySet = IndexSet<String>;

#[derive(Debug, Clone)]
pub struct LayerRegistry {
    specs: Vec<LayerSpec>,
    index: IndexMap<String, usize>,
    default_visible: VisibilitySet,
}

impl LayerRegistry {
    /// Validates and indexes `specs`.
    ///
    /// Fails on duplicate ids, ids that cannot round-trip through the serialized state, empty
    /// prefixes, and prefix pairs where one is a prefix of the other (a concrete layer could
    /// then resolve to either spec).
    pub fn new(specs: Vec<LayerSpec>) -> Result<Self> {
        let mut index = IndexMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if spec.id.is_empty() || spec.id.contains(',') {
                return Err(Error::InvalidLayerId {
                    id: spec.id.clone(),
                });
            }
            if spec.prefix.is_empty() {
                return Err(Error::EmptyPrefix {
                    id: spec.id.clone(),
                });
            }
            if index.insert(spec.id.clone(), i).is_some() {
                return Err(Error::DuplicateLayerId {
                    id: spec.id.clone(),
                });
            }
        }

        for (i, a) in specs.iter().enumerate() {
            for b in &specs[i + 1..] {
                if a.prefix.starts_with(&b.prefix) || b.prefix.starts_with(&a.prefix) {
                    return Err(Error::AmbiguousPrefix {
                        id: a.id.clone(),
                        prefix: a.prefix.clone(),
                        other_id: b.id.clone(),
                        other_prefix: b.prefix.clone(),
                    });
                }
            }
        }

        let mut default_visible = VisibilitySet::new();
        let mut seen_groups = IndexSet::new();
        for spec in specs.iter().filter(|s| s.default_visible) {
            if let Some(group) = &spec.group {
                if !seen_groups.insert(group.as_str()) {
                    tracing::warn!(
                        id = spec.id.as_str(),
                        group = group.as_str(),
                        "more than one default member in radio group; keeping the first"
                    );
                    continue;
                }
            }
            default_visible.insert(spec.id.clone());
        }

        Ok(Self {
            specs,
            index,
            default_visible,
        })
    }

    pub fn specs(&self) -> &[LayerSpec] {
        &self.specs
    }

    pub fn get(&self, id: &str) -> Option<&LayerSpec> {
        self.index.get(id).map(|&i| &self.specs[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn default_visible(&self) -> &VisibilitySet {
        &self.default_visible
    }

    /// Other members of `id`'s radio group (empty when it has no group).
    pub fn group_siblings<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a LayerSpec> + 'a {
        let group = self.get(id).and_then(|s| s.group.as_deref());
        self.specs
            .iter()
            .filter(move |s| group.is_some() && s.group.as_deref() == group && s.id != id)
    }

    /// Members of the named radio group in declaration order.
    pub fn group_members<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a LayerSpec> + 'a {
        self.specs
            .iter()
            .filter(move |s| s.group.as_deref() == Some(group))
    }

    /// The layer spec whose prefix the concrete layer id starts with.
    pub fn resolve(&self, concrete: &str) -> Option<&LayerSpec> {
        self.specs.iter().find(|s| concrete.starts_with(&s.prefix))
    }

    /// Visibility of every resolvable concrete layer for the given visible set.
    pub fn visibility_plan<'a, I>(&self, concrete: I, visible: &VisibilitySet) -> Vec<(String, Visibility)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        concrete
            .into_iter()
            .filter_map(|layer| {
                let spec = self.resolve(layer)?;
                Some((
                    layer.to_string(),
                    Visibility::from_shown(visible.contains(&spec.id)),
                ))
            })
            .collect()
    }

    /// Normalizes a candidate visible set: unknown ids are dropped, duplicates collapse, and
    /// only the first member of each radio group is kept.
    pub fn sanitize<I, S>(&self, ids: I) -> VisibilitySet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = VisibilitySet::new();
        let mut groups = IndexSet::new();
        for id in ids {
            let id = id.as_ref();
            let Some(spec) = self.get(id) else {
                tracing::debug!(id, "ignoring unknown layer id");
                continue;
            };
            if let Some(group) = spec.group.as_deref() {
                if !groups.insert(group) {
                    tracing::debug!(id, group, "ignoring second member of radio group");
                    continue;
                }
            }
            out.insert(spec.id.clone());
        }
        out
    }

    /// Hides, inside a style document, every layer that resolves to a spec not in `visible`.
    ///
    /// This runs before the map exists so hidden layers never flash on first render. Layers
    /// resolving to visible specs, and layers no spec claims, are left as authored.
    pub fn hide_in_style(&self, style: &mut Value, visible: &VisibilitySet) {
        let Some(layers) = style.get_mut("layers").and_then(Value::as_array_mut) else {
            return;
        };
        for layer in layers {
            let Some(id) = layer.get("id").and_then(Value::as_str) else {
                continue;
            };
            let Some(spec) = self.resolve(id) else {
                continue;
            };
            if visible.contains(&spec.id) {
                continue;
            }
            let Some(obj) = layer.as_object_mut() else {
                continue;
            };
            let layout = obj
                .entry("layout")
                .or_insert_with(|| Value::Object(Map::new()));
            if !layout.is_object() {
                *layout = Value::Object(Map::new());
            }
            if let Some(layout) = layout.as_object_mut() {
                layout.insert(
                    "visibility".to_string(),
                    Value::String(Visibility::None.as_str().to_string()),
                );
            }
        }
    }
}

/// Whether two visible sets hold the same ids, ignoring order.
pub fn same_members(a: &VisibilitySet, b: &VisibilitySet) -> bool {
    a.len() == b.len() && a.iter().all(|id| b.contains(id))
}
