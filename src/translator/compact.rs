//! Output compaction.

use serde_json::Value;

/// Collapse `{"bool": {"filter": [x]}}` and `{"bool": {"should": [x]}}` to
/// `x`, bottom-up. Running it twice is a no-op.
pub fn compact(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(compact).collect()),
        Value::Object(map) => {
            let map: serde_json::Map<String, Value> =
                map.into_iter().map(|(k, v)| (k, compact(v))).collect();
            match sole_clause(&map) {
                Some(inner) => inner,
                None => Value::Object(map),
            }
        }
        other => other,
    }
}

fn sole_clause(map: &serde_json::Map<String, Value>) -> Option<Value> {
    if map.len() != 1 {
        return None;
    }
    let bool_query = map.get("bool")?.as_object()?;
    if bool_query.len() != 1 {
        return None;
    }
    let clauses = bool_query
        .get("filter")
        .or_else(|| bool_query.get("should"))?
        .as_array()?;
    match clauses.as_slice() {
        [only] => Some(only.clone()),
        _ => None,
    }
}
