//! A headless [`RenderEngine`] backed by a MapLibre style document.

use crate::engine::{RenderEngine, Visibility};
use crate::predicate::Predicate;
use serde_json::{Map, Value};

/// A MapLibre style JSON document acting as the rendering engine.
///
/// Visibility lives in `layers[].layout.visibility` and predicates in `layers[].filter`, exactly
/// where a browser map would read them, so a baked document can be handed to a map as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDocument {
    style: Value,
    ready: bool,
}

impl StyleDocument {
    /// Wraps a style that is still loading.
    pub fn loading(style: Value) -> Self {
        Self {
            style,
            ready: false,
        }
    }

    /// Wraps a style that is already fully loaded.
    pub fn loaded(style: Value) -> Self {
        Self { style, ready: true }
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Swaps in a new style. Like a browser map, this discards every custom predicate and
    /// visibility set on the previous style, and the new one starts out not ready.
    pub fn reload(&mut self, style: Value) {
        self.style = style;
        self.ready = false;
    }

    pub fn as_value(&self) -> &Value {
        &self.style
    }

    pub fn into_value(self) -> Value {
        self.style
    }

    fn layers(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.style
            .get("layers")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
    }

    fn layer(&self, id: &str) -> Option<&Map<String, Value>> {
        self.layers()
            .find(|l| l.get("id").and_then(Value::as_str) == Some(id))
    }

    fn layer_mut(&mut self, id: &str) -> Option<&mut Map<String, Value>> {
        self.style
            .get_mut("layers")?
            .as_array_mut()?
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|l| l.get("id").and_then(Value::as_str) == Some(id))
    }
}

impl RenderEngine for StyleDocument {
    fn is_style_ready(&self) -> bool {
        self.ready
    }

    fn layer_ids(&self) -> Vec<String> {
        self.layers()
            .filter_map(|l| l.get("id").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }

    fn layer_exists(&self, layer: &str) -> bool {
        self.layer(layer).is_some()
    }

    fn visibility(&self, layer: &str) -> Option<Visibility> {
        let layer = self.layer(layer)?;
        let raw = layer
            .get("layout")
            .and_then(|l| l.get("visibility"))
            .and_then(Value::as_str);
        Some(match raw {
            Some("none") => Visibility::None,
            _ => Visibility::Visible,
        })
    }

    fn set_visibility(&mut self, layer: &str, visibility: Visibility) {
        let Some(layer) = self.layer_mut(layer) else {
            return;
        };
        let layout = layer
            .entry("layout")
            .or_insert_with(|| Value::Object(Map::new()));
        if !layout.is_object() {
            *layout = Value::Object(Map::new());
        }
        if let Some(layout) = layout.as_object_mut() {
            layout.insert(
                "visibility".to_string(),
                Value::String(visibility.as_str().to_string()),
            );
        }
    }

    fn predicate(&self, layer: &str) -> Option<Predicate> {
        let filter = self.layer(layer)?.get("filter")?;
        if filter.is_null() {
            return None;
        }
        Some(Predicate::from_value(filter.clone()))
    }

    fn set_predicate(&mut self, layer: &str, predicate: Option<&Predicate>) {
        let Some(layer) = self.layer_mut(layer) else {
            return;
        };
        match predicate {
            Some(p) => {
                layer.insert("filter".to_string(), p.as_value().clone());
            }
            None => {
                layer.remove("filter");
            }
        }
    }
}
