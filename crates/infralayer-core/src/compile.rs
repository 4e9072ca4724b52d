//! Selection -> predicate compilation.
//!
//! All functions are pure. An empty selection never compiles to an always-true or always-false
//! predicate; it compiles to [`CompiledFilter::MatchNothing`] so the caller hides the layer.

use crate::options::{Category, KNOWN_SUBSTATION_TYPES, OptionKind};
use crate::predicate::{Predicate, coalesce, get, to_number};
use crate::selection::SelectionSet;
use serde_json::{Value, json};

/// Result of compiling one category's selection.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledFilter {
    /// No category restriction; the layer keeps only its own predicate.
    Unrestricted,
    /// Nothing can match; the layer is hidden.
    MatchNothing,
    /// Restrict the layer to features matching this predicate.
    Predicate(Predicate),
}

impl CompiledFilter {
    pub fn predicate(&self) -> Option<&Predicate> {
        match self {
            Self::Predicate(p) => Some(p),
            Self::Unrestricted | Self::MatchNothing => None,
        }
    }

    pub fn is_match_nothing(&self) -> bool {
        matches!(self, Self::MatchNothing)
    }
}

/// Compiles the selection for its own category.
pub fn compile(selection: &SelectionSet) -> CompiledFilter {
    if selection.is_empty() {
        return CompiledFilter::MatchNothing;
    }
    let category = selection.category();
    if category.is_exhaustive() && selection.is_full() {
        return CompiledFilter::Unrestricted;
    }
    match category {
        Category::Plants => compile_sources(selection),
        Category::Substations => compile_substations(selection),
        Category::PowerLines => compile_voltage_bands(selection),
    }
}

/// Raw `source` tokens of the selected plant options, in table order.
pub fn selected_source_tokens(selection: &SelectionSet) -> Vec<&'static str> {
    selection
        .options()
        .filter_map(|o| match o.kind {
            OptionKind::Source { tokens } => Some(tokens),
            _ => None,
        })
        .flatten()
        .copied()
        .collect()
}

fn compile_sources(selection: &SelectionSet) -> CompiledFilter {
    let tokens = selected_source_tokens(selection);
    if tokens.is_empty() {
        return CompiledFilter::MatchNothing;
    }
    CompiledFilter::Predicate(Predicate::in_literal(get("source"), &tokens))
}

/// Substations whose type token is none of the known types (a missing token counts as `""`).
pub fn other_substation_predicate() -> Predicate {
    Predicate::not(Predicate::in_literal(
        coalesce(get("substation"), json!("")),
        KNOWN_SUBSTATION_TYPES,
    ))
}

fn compile_substations(selection: &SelectionSet) -> CompiledFilter {
    let mut named = Vec::new();
    let mut has_other = false;
    for option in selection.options() {
        match option.kind {
            OptionKind::SubstationType => named.push(option.id),
            OptionKind::SubstationOther => has_other = true,
            _ => {}
        }
    }

    let in_named = (!named.is_empty()).then(|| Predicate::in_literal(get("substation"), &named));
    match (in_named, has_other) {
        (Some(in_named), true) => CompiledFilter::Predicate(Predicate::any([
            in_named,
            other_substation_predicate(),
        ])),
        (Some(in_named), false) => CompiledFilter::Predicate(in_named),
        (None, true) => CompiledFilter::Predicate(other_substation_predicate()),
        (None, false) => CompiledFilter::MatchNothing,
    }
}

fn frequency_number() -> Value {
    to_number(get("frequency"))
}

/// Lines with a frequency of zero.
pub fn hvdc_line_predicate() -> Predicate {
    Predicate::all([
        Predicate::has("frequency"),
        Predicate::compare("==", frequency_number(), json!(0)),
    ])
}

/// Lines with a non-empty frequency other than 0, 50 or 60 Hz.
pub fn traction_line_predicate() -> Predicate {
    Predicate::all([
        Predicate::has("frequency"),
        Predicate::compare("!=", get("frequency"), json!("")),
        Predicate::compare("!=", frequency_number(), json!(0)),
        Predicate::compare("!=", frequency_number(), json!(50)),
        Predicate::compare("!=", frequency_number(), json!(60)),
    ])
}

/// A voltage interval band. HVDC and traction lines are excluded because their voltage alone
/// would otherwise place them in an interval band.
pub fn voltage_band_predicate(min_kv: Option<f64>, max_kv: Option<f64>) -> Predicate {
    let voltage = to_number(coalesce(get("voltage"), json!(0)));
    let mut parts = vec![
        Predicate::not(hvdc_line_predicate()),
        Predicate::not(traction_line_predicate()),
    ];
    if let Some(min) = min_kv {
        parts.push(Predicate::compare(">=", voltage.clone(), kv(min)));
    }
    if let Some(max) = max_kv {
        parts.push(Predicate::compare("<", voltage, kv(max)));
    }
    Predicate::all(parts)
}

fn compile_voltage_bands(selection: &SelectionSet) -> CompiledFilter {
    let mut conditions = Vec::new();
    if selection.contains("hvdc") {
        conditions.push(hvdc_line_predicate());
    }
    if selection.contains("traction") {
        conditions.push(traction_line_predicate());
    }
    for option in selection.options() {
        if let OptionKind::VoltageRange { min_kv, max_kv } = option.kind {
            conditions.push(voltage_band_predicate(min_kv, max_kv));
        }
    }

    match conditions.len() {
        0 => CompiledFilter::MatchNothing,
        1 => CompiledFilter::Predicate(conditions.remove(0)),
        _ => CompiledFilter::Predicate(Predicate::any(conditions)),
    }
}

/// Whole kV bounds are emitted as integers so the expressions read like hand-written ones.
fn kv(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}
