use crate::expr::EngineResult;
use cel_interpreter::Value;
use cel_interpreter::objects::{Key, Map};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

const LOG_TARGET: &str = "     input";

/// Serialize a projected input document, logging it for diagnosis.
pub fn encode<T: Serialize>(input: &T, kind: &str) -> EngineResult<serde_json::Value> {
    let value = serde_json::to_value(input)?;

    if log::log_enabled!(target: LOG_TARGET, log::Level::Debug) {
        log::debug!(target: LOG_TARGET, "Serialized {kind} input: {value}");
    }

    Ok(value)
}

/// Convert a JSON document to an interpreter value.
///
/// Integral numbers become `int` (or `uint` beyond the `int` range), everything
/// else numeric becomes `double`.
#[must_use]
pub fn to_cel_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::UInt(u)
            } else {
                Value::Float(n.as_f64().unwrap_or_default())
            }
        }
        serde_json::Value::String(s) => Value::String(Arc::new(s.clone())),
        serde_json::Value::Array(items) => Value::List(Arc::new(items.iter().map(to_cel_value).collect())),
        serde_json::Value::Object(fields) => {
            let map: HashMap<Key, Value> = fields
                .iter()
                .map(|(name, field)| (Key::String(Arc::new(name.clone())), to_cel_value(field)))
                .collect();
            Value::Map(Map::from(map))
        }
    }
}

/// The field `name` of a map value, `null` when absent or when `value` is not a map.
#[must_use]
pub fn cel_field(value: &Value, name: &str) -> Value {
    match value {
        Value::Map(map) => map.map.get(&Key::String(Arc::new(name.to_string()))).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}
