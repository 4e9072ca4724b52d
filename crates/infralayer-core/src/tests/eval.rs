//! A reference evaluator for the subset of MapLibre expressions the compiler emits.
//!
//! Evaluation errors (e.g. `to-number` of a non-numeric string) make the whole filter false,
//! as in MapLibre.

use crate::predicate::Predicate;
use serde_json::{Value, json};

pub(crate) fn matches(predicate: &Predicate, properties: &Value) -> bool {
    eval(predicate.as_value(), properties) == Some(Value::Bool(true))
}

fn eval(expr: &Value, props: &Value) -> Option<Value> {
    let Value::Array(items) = expr else {
        return Some(expr.clone());
    };
    let op = items.first()?.as_str()?;
    let args = &items[1..];
    match op {
        "literal" => Some(args.first()?.clone()),
        "get" => {
            let key = args.first()?.as_str()?;
            Some(props.get(key).cloned().unwrap_or(Value::Null))
        }
        "has" => {
            let key = args.first()?.as_str()?;
            Some(Value::Bool(props.get(key).is_some()))
        }
        "coalesce" => {
            for arg in args {
                let v = eval(arg, props)?;
                if !v.is_null() {
                    return Some(v);
                }
            }
            Some(Value::Null)
        }
        "to-number" => to_number(&eval(args.first()?, props)?).map(|n| json!(n)),
        "!" => Some(Value::Bool(!eval(args.first()?, props)?.as_bool()?)),
        "all" => {
            for arg in args {
                if !eval(arg, props)?.as_bool()? {
                    return Some(Value::Bool(false));
                }
            }
            Some(Value::Bool(true))
        }
        "any" => {
            for arg in args {
                if eval(arg, props)?.as_bool()? {
                    return Some(Value::Bool(true));
                }
            }
            Some(Value::Bool(false))
        }
        "in" => {
            let needle = eval(args.first()?, props)?;
            let haystack = eval(args.get(1)?, props)?;
            let found = match haystack {
                Value::Array(values) => values.iter().any(|v| equal(v, &needle)),
                Value::String(s) => s.contains(needle.as_str()?),
                _ => return None,
            };
            Some(Value::Bool(found))
        }
        "==" | "!=" => {
            let lhs = eval(args.first()?, props)?;
            let rhs = eval(args.get(1)?, props)?;
            let eq = equal(&lhs, &rhs);
            Some(Value::Bool(if op == "==" { eq } else { !eq }))
        }
        ">=" | ">" | "<=" | "<" => {
            let lhs = eval(args.first()?, props)?.as_f64()?;
            let rhs = eval(args.get(1)?, props)?.as_f64()?;
            let out = match op {
                ">=" => lhs >= rhs,
                ">" => lhs > rhs,
                "<=" => lhs <= rhs,
                _ => lhs < rhs,
            };
            Some(Value::Bool(out))
        }
        "geometry-type" => Some(props.get("$type").cloned().unwrap_or(Value::Null)),
        _ => None,
    }
}

fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

#[test]
fn evaluator_handles_errors_as_no_match() {
    let p = Predicate::from_value(json!([">=", ["to-number", ["get", "voltage"]], 10]));
    assert!(matches(&p, &json!({ "voltage": "110" })));
    assert!(!matches(&p, &json!({ "voltage": "110;20" })));
    assert!(!matches(&p, &json!({ "voltage": 5 })));
}
