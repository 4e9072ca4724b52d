use crate::engine::{RenderEngine, Visibility};
use crate::predicate::Predicate;
use crate::style::StyleDocument;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EngineWrite {
    Visibility(String, Visibility),
    Predicate(String, Option<Value>),
}

/// A style document that records every write made to it.
#[derive(Debug, Clone)]
pub(crate) struct RecordingEngine {
    pub(crate) doc: StyleDocument,
    pub(crate) writes: Vec<EngineWrite>,
}

impl RecordingEngine {
    pub(crate) fn loaded(style: Value) -> Self {
        Self {
            doc: StyleDocument::loaded(style),
            writes: Vec::new(),
        }
    }

    pub(crate) fn loading(style: Value) -> Self {
        Self {
            doc: StyleDocument::loading(style),
            writes: Vec::new(),
        }
    }

    pub(crate) fn visibility_writes(&self, layer: &str) -> usize {
        self.writes
            .iter()
            .filter(|w| matches!(w, EngineWrite::Visibility(l, _) if l == layer))
            .count()
    }

    pub(crate) fn predicate_writes(&self, layer: &str) -> usize {
        self.writes
            .iter()
            .filter(|w| matches!(w, EngineWrite::Predicate(l, _) if l == layer))
            .count()
    }

    pub(crate) fn shown(&self, layer: &str) -> bool {
        self.doc.visibility(layer) == Some(Visibility::Visible)
    }

    pub(crate) fn filter(&self, layer: &str) -> Option<Value> {
        self.doc.predicate(layer).map(Predicate::into_value)
    }
}

impl RenderEngine for RecordingEngine {
    fn is_style_ready(&self) -> bool {
        self.doc.is_style_ready()
    }

    fn layer_ids(&self) -> Vec<String> {
        self.doc.layer_ids()
    }

    fn layer_exists(&self, layer: &str) -> bool {
        self.doc.layer_exists(layer)
    }

    fn visibility(&self, layer: &str) -> Option<Visibility> {
        self.doc.visibility(layer)
    }

    fn set_visibility(&mut self, layer: &str, visibility: Visibility) {
        self.writes
            .push(EngineWrite::Visibility(layer.to_string(), visibility));
        self.doc.set_visibility(layer, visibility);
    }

    fn predicate(&self, layer: &str) -> Option<Predicate> {
        self.doc.predicate(layer)
    }

    fn set_predicate(&mut self, layer: &str, predicate: Option<&Predicate>) {
        self.writes.push(EngineWrite::Predicate(
            layer.to_string(),
            predicate.map(|p| p.as_value().clone()),
        ));
        self.doc.set_predicate(layer, predicate);
    }
}

/// Power layer filter shared by the fixture's substation layers.
pub(crate) fn substation_base() -> Value {
    json!(["==", ["geometry-type"], "Polygon"])
}

/// A trimmed-down Open Infrastructure Map style with a subset of the power layers. Some governed
/// layers carry their own filter; `power_plant_outline_underground` and `power_line_ref` are
/// missing.
pub(crate) fn fixture_style() -> Value {
    json!({
        "version": 8,
        "layers": [
            { "id": "osm_base", "type": "raster" },
            { "id": "satellite_base", "type": "raster" },
            { "id": "black_marble", "type": "raster" },
            { "id": "boundaries_country", "type": "line" },
            { "id": "heatmap_solar", "type": "heatmap" },
            { "id": "power_line_case", "type": "line", "filter": ["==", ["get", "tunnel"], false] },
            { "id": "power_line_1", "type": "line" },
            { "id": "power_line_label", "type": "symbol" },
            { "id": "power_plant", "type": "fill" },
            { "id": "power_plant_outline", "type": "line", "filter": ["!", ["has", "construction"]] },
            { "id": "power_solar_panel", "type": "fill" },
            { "id": "power_wind_turbine", "type": "symbol" },
            { "id": "power_substation", "type": "fill", "filter": substation_base() },
            { "id": "power_substation_point", "type": "circle" },
            { "id": "power_tower", "type": "symbol" },
            { "id": "telecoms_line", "type": "line" },
            { "id": "water_pipeline", "type": "line" },
            { "id": "label_country", "type": "symbol" },
            { "id": "hillshade", "type": "raster" }
        ]
    })
}
