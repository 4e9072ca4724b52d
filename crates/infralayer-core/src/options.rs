//! Static filter categories, their options, and the concrete layers each category governs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// One filterable dimension of the power layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Power plants by energy source.
    Plants,
    /// Substations by type.
    Substations,
    /// Power lines by voltage band.
    #[serde(rename = "voltage")]
    PowerLines,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Plants, Self::Substations, Self::PowerLines];

    /// Wire name used by the control panel and in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plants => "plants",
            Self::Substations => "substations",
            Self::PowerLines => "voltage",
        }
    }

    /// Parses a wire name; unknown names yield `None` so callers can ignore foreign input.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "plants" => Some(Self::Plants),
            "substations" => Some(Self::Substations),
            "voltage" => Some(Self::PowerLines),
            _ => None,
        }
    }

    pub fn options(self) -> &'static [FilterOption] {
        match self {
            Self::Plants => SOURCE_OPTIONS,
            Self::Substations => SUBSTATION_OPTIONS,
            Self::PowerLines => VOLTAGE_BAND_OPTIONS,
        }
    }

    /// Looks up an option by id, returning the table's own `'static` entry.
    pub fn option(self, id: &str) -> Option<&'static FilterOption> {
        self.options().iter().find(|o| o.id == id)
    }

    /// Layers that receive a category predicate.
    pub fn filtered_layers(self) -> &'static [&'static str] {
        match self {
            Self::Plants => POWER_PLANT_LAYER_IDS,
            Self::Substations => SUBSTATION_LAYER_IDS,
            Self::PowerLines => POWER_LINE_LAYER_IDS,
        }
    }

    /// Layers that only show a single option and are toggled without a predicate.
    pub fn toggled_layers(self) -> &'static [ToggledLayer] {
        match self {
            Self::Plants => SOURCE_SPECIFIC_LAYERS,
            Self::Substations | Self::PowerLines => &[],
        }
    }

    /// Whether every feature matches at least one option, so that a full selection is no
    /// restriction at all.
    ///
    /// Substations are exhaustive thanks to the `other` bucket. Plant sources are not (many
    /// sources have no option) and neither are voltage bands (non-numeric voltages match no
    /// band).
    pub fn is_exhaustive(self) -> bool {
        matches!(self, Self::Substations)
    }

    /// Whether `layer` is governed by this category in any way.
    pub fn governs(self, layer: &str) -> bool {
        self.filtered_layers().contains(&layer)
            || self.toggled_layers().iter().any(|t| t.layer == layer)
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Plants => 0,
            Self::Substations => 1,
            Self::PowerLines => 2,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// One value per category, indexable by [`Category`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerCategory<T>([T; 3]);

impl<T> PerCategory<T> {
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self(Category::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Category> for PerCategory<T> {
    type Output = T;

    fn index(&self, category: Category) -> &T {
        &self.0[category.index()]
    }
}

impl<T> IndexMut<Category> for PerCategory<T> {
    fn index_mut(&mut self, category: Category) -> &mut T {
        &mut self.0[category.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOption {
    pub id: &'static str,
    pub label_key: &'static str,
    #[serde(flatten)]
    pub kind: OptionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OptionKind {
    /// Plant source; matches any of the raw `source` tokens.
    Source { tokens: &'static [&'static str] },
    /// A known substation type; the option id is the raw token.
    SubstationType,
    /// Substations whose type is none of the known ones.
    SubstationOther,
    /// Half-open kV interval `[min_kv, max_kv)`; a missing bound is unbounded.
    #[serde(rename_all = "camelCase")]
    VoltageRange {
        min_kv: Option<f64>,
        max_kv: Option<f64>,
    },
    Hvdc,
    Traction,
}

/// A layer shown only when one specific option is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggledLayer {
    pub layer: &'static str,
    pub option: &'static str,
}

pub const POWER_PLANT_LAYER_IDS: &[&str] = &[
    "power_plant",
    "power_plant_outline",
    "power_plant_outline_underground",
    "power_plant_outline_construction",
    "power_plant_symbol",
];

pub const SUBSTATION_LAYER_IDS: &[&str] = &[
    "power_substation",
    "power_substation_outline",
    "power_substation_outline_underground",
    "power_substation_point",
    "power_substation_ref_label",
    "power_substation_label",
    "power_substation_label_high_zoom",
    "power_converter_point",
];

pub const POWER_LINE_LAYER_IDS: &[&str] = &[
    "power_line_case",
    "power_line_underground_1",
    "power_line_underground_2",
    "power_line_underground_3",
    "power_line_disused",
    "power_line_1",
    "power_line_2",
    "power_line_3",
    "power_line_ref",
    "power_line_label",
    "power_line_label_low_zoom",
];

pub const SOURCE_SPECIFIC_LAYERS: &[ToggledLayer] = &[
    ToggledLayer {
        layer: "power_solar_panel",
        option: "solar",
    },
    ToggledLayer {
        layer: "power_wind_turbine",
        option: "wind",
    },
    ToggledLayer {
        layer: "power_wind_turbine_point",
        option: "wind",
    },
];

pub const KNOWN_SUBSTATION_TYPES: &[&str] = &[
    "transmission",
    "distribution",
    "traction",
    "converter",
    "transition",
];

pub const SOURCE_OPTIONS: &[FilterOption] = &[
    source("solar", "power.source.solar", &["solar"]),
    source("wind", "power.source.wind", &["wind"]),
    source("coal", "power.source.coal", &["coal"]),
    source("gas", "power.source.oil-gas", &["gas", "oil", "diesel"]),
    source("nuclear", "power.source.nuclear", &["nuclear"]),
    source("hydro", "power.source.hydro", &["hydro", "tidal", "wave"]),
];

pub const SUBSTATION_OPTIONS: &[FilterOption] = &[
    substation("transmission", "filters.substation-type.transmission"),
    substation("distribution", "filters.substation-type.distribution"),
    substation("traction", "filters.substation-type.traction"),
    substation("converter", "filters.substation-type.converter"),
    substation("transition", "filters.substation-type.transition"),
    FilterOption {
        id: "other",
        label_key: "filters.substation-type.other",
        kind: OptionKind::SubstationOther,
    },
];

pub const VOLTAGE_BAND_OPTIONS: &[FilterOption] = &[
    band("v-under-10", "filters.voltage-band.under-10", None, Some(10.0)),
    band("v-10-52", "filters.voltage-band.10-52", Some(10.0), Some(52.0)),
    band("v-52-132", "filters.voltage-band.52-132", Some(52.0), Some(132.0)),
    band("v-132-220", "filters.voltage-band.132-220", Some(132.0), Some(220.0)),
    band("v-220-345", "filters.voltage-band.220-345", Some(220.0), Some(345.0)),
    band("v-345-plus", "filters.voltage-band.345-plus", Some(345.0), None),
    FilterOption {
        id: "hvdc",
        label_key: "filters.voltage-band.hvdc",
        kind: OptionKind::Hvdc,
    },
    FilterOption {
        id: "traction",
        label_key: "filters.voltage-band.traction",
        kind: OptionKind::Traction,
    },
];

const fn source(
    id: &'static str,
    label_key: &'static str,
    tokens: &'static [&'static str],
) -> FilterOption {
    FilterOption {
        id,
        label_key,
        kind: OptionKind::Source { tokens },
    }
}

const fn substation(id: &'static str, label_key: &'static str) -> FilterOption {
    FilterOption {
        id,
        label_key,
        kind: OptionKind::SubstationType,
    }
}

const fn band(
    id: &'static str,
    label_key: &'static str,
    min_kv: Option<f64>,
    max_kv: Option<f64>,
) -> FilterOption {
    FilterOption {
        id,
        label_key,
        kind: OptionKind::VoltageRange { min_kv, max_kv },
    }
}
