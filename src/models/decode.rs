use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::DecodeError;

/// Pure transform from a raw REST payload into a view model.
pub trait Decode: Clone + Send + Sync + 'static {
    type Output: Clone + PartialEq + Serialize + Send + Sync + 'static;

    fn decode(&self, raw: Value) -> Result<Self::Output, DecodeError>;
}

/// Decode every element of `raw` and index the results by `key`.
///
/// `raw` may be an array, an object (its values are used) or null. Entries
/// sharing a key overwrite each other; the last one wins.
pub(crate) fn as_associative_map<T, K, F, G>(
    raw: Value,
    decode: F,
    key: G,
) -> Result<BTreeMap<K, T>, DecodeError>
where
    F: Fn(Value) -> Result<T, DecodeError>,
    G: Fn(&T) -> K,
    K: Ord,
{
    let items: Vec<Value> = match raw {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::Null => Vec::new(),
        other => {
            return Err(DecodeError::InvalidField {
                field: "list",
                reason: format!("expected an array, got {}", type_name(&other)),
            })
        }
    };

    let mut result = BTreeMap::new();
    for item in items {
        let model = decode(item)?;
        result.insert(key(&model), model);
    }
    Ok(result)
}

/// Drop payload keys that a view model computes itself.
pub(crate) fn strip_computed(extra: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        extra.remove(*key);
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
