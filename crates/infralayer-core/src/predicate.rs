//! MapLibre-style boolean expressions.
//!
//! Predicates are kept as JSON (`serde_json::Value`) because that is what rendering engines
//! consume; the constructors here only cover the operators the filter compiler emits.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate(Value);

impl Predicate {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns the expression operator (`"all"`, `"in"`, ...) if this is an expression array.
    pub fn operator(&self) -> Option<&str> {
        self.0.as_array()?.first()?.as_str()
    }

    pub fn all(parts: impl IntoIterator<Item = Predicate>) -> Self {
        Self::variadic("all", parts)
    }

    pub fn any(parts: impl IntoIterator<Item = Predicate>) -> Self {
        Self::variadic("any", parts)
    }

    pub fn not(inner: Predicate) -> Self {
        Self(json!(["!", inner.0]))
    }

    /// `["in", <value>, ["literal", [tokens...]]]`.
    pub fn in_literal<S: AsRef<str>>(value: Value, tokens: &[S]) -> Self {
        let tokens: Vec<Value> = tokens
            .iter()
            .map(|t| Value::String(t.as_ref().to_string()))
            .collect();
        Self(json!(["in", value, ["literal", tokens]]))
    }

    pub fn has(property: &str) -> Self {
        Self(json!(["has", property]))
    }

    pub fn compare(op: &str, lhs: Value, rhs: Value) -> Self {
        Self(json!([op, lhs, rhs]))
    }

    /// Conjunction of a layer's own filter with a category filter.
    ///
    /// The base is nested as-is rather than flattened so the result stays a pure function of
    /// its two inputs.
    pub fn and_base(base: Option<&Predicate>, filter: &Predicate) -> Self {
        match base {
            Some(base) => Self(json!(["all", base.0, filter.0])),
            None => filter.clone(),
        }
    }

    fn variadic(op: &str, parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut out = vec![Value::String(op.to_string())];
        out.extend(parts.into_iter().map(Predicate::into_value));
        Self(Value::Array(out))
    }
}

impl From<Value> for Predicate {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// `["get", property]`.
pub fn get(property: &str) -> Value {
    json!(["get", property])
}

/// `["coalesce", value, fallback]`.
pub fn coalesce(value: Value, fallback: Value) -> Value {
    json!(["coalesce", value, fallback])
}

/// `["to-number", value]`.
pub fn to_number(value: Value) -> Value {
    json!(["to-number", value])
}
