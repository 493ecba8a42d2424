//! Request value coercion
//!
//! Request parameters mostly arrive as strings. Before a value is compared
//! with a column it is converted to the JSON shape matching the column kind,
//! so the database receives a correctly typed parameter.

use crate::temporal::parse_temporal;
use crate::types::ColumnKind;
use serde_json::{Number, Value};

/// Coerce a scalar request value to the kind of the column it is compared with.
///
/// Returns `None` when the value is null, not a scalar, or cannot be read as
/// the column kind.
pub fn coerce_value(kind: ColumnKind, value: &Value) -> Option<Value> {
    match kind {
        ColumnKind::String => value_to_text(value).map(Value::String),
        ColumnKind::Numeric => coerce_numeric(value),
        ColumnKind::Boolean => coerce_boolean(value),
        ColumnKind::Date => coerce_date(value),
        ColumnKind::Other => match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => Some(value.clone()),
            _ => None,
        },
    }
}

/// Textual form of a scalar value, `None` for null, arrays and objects
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_numeric(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Some(Value::Number(i.into()))
            } else {
                s.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
            }
        }
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(Value::Bool(false)),
            Some(1) => Some(Value::Bool(true)),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_date(value: &Value) -> Option<Value> {
    let Value::String(s) = value else {
        return None;
    };
    let s = s.trim();
    parse_temporal(s).map(|_| Value::String(s.to_string()))
}
