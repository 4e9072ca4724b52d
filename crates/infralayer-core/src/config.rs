use crate::options::{Category, PerCategory};
use crate::registry::LayerSpec;
use crate::selection::SelectionSet;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Static controller configuration: the layer table and the initial filter state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub selections: SelectionDefaults,
}

/// Initial selections per category. A missing list means "every option".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plants: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<Vec<String>>,
    /// Category names that start out disabled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_categories: Vec<String>,
}

impl SelectionDefaults {
    fn ids(&self, category: Category) -> Option<&[String]> {
        match category {
            Category::Plants => self.plants.as_deref(),
            Category::Substations => self.substations.as_deref(),
            Category::PowerLines => self.voltage.as_deref(),
        }
    }

    /// Initial selections; unknown option ids are dropped.
    pub fn initial_selections(&self) -> PerCategory<SelectionSet> {
        PerCategory::from_fn(|category| match self.ids(category) {
            Some(ids) => SelectionSet::from_ids(category, ids),
            None => SelectionSet::all(category),
        })
    }

    /// Initial enabled flags; unknown category names are ignored.
    pub fn initial_enabled(&self) -> PerCategory<bool> {
        let mut enabled = PerCategory::from_fn(|_| true);
        for name in &self.hidden_categories {
            match Category::parse(name) {
                Some(category) => enabled[category] = false,
                None => tracing::debug!(name = name.as_str(), "ignoring unknown category"),
            }
        }
        enabled
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            layers: default_layer_specs(),
            selections: SelectionDefaults::default(),
        }
    }
}

impl ControllerConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::InvalidConfig {
            message: e.to_string(),
        })
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::InvalidConfig {
            message: e.to_string(),
        })
    }
}

/// The Open Infrastructure Map layer table.
pub fn default_layer_specs() -> Vec<LayerSpec> {
    vec![
        LayerSpec::new("A", "openstreetmap", "osm_", true).in_group("background"),
        LayerSpec::new("M", "layers.satellite", "satellite_", false).in_group("background"),
        LayerSpec::new("N", "layers.nighttime-lights", "black_marble", false)
            .in_group("background"),
        LayerSpec::new("L", "layers.labels", "label_", true),
        LayerSpec::new("B", "layers.borders", "boundaries_", true),
        LayerSpec::new("S", "layers.solar-generation", "heatmap_", false),
        LayerSpec::new("P", "layers.power", "power_", true),
        LayerSpec::new("T", "layers.telecoms", "telecoms_", false),
        LayerSpec::new("O", "layers.petroleum", "petroleum_", false),
        LayerSpec::new("I", "layers.other-pipelines", "pipeline_", false),
        LayerSpec::new("W", "layers.water", "water_", false),
        LayerSpec::new("E", "layers.osmose-power", "osmose_errors_power", false),
    ]
}
