//! Flattening of nested GDC hits.
//!
//! A hit is walked along a dotted field path. Arrays may appear at any depth
//! (the GDC wraps every to-many relation in one, often with a single
//! element) and are flattened in document order. Missing keys and nulls
//! contribute no values. Anything else that does not fit the path is a
//! shape violation.

use serde_json::Value;

use crate::error::IdMapError;

pub fn extract_leaves(record: &Value, path: &str) -> Result<Vec<String>, IdMapError> {
    let segments = path
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>();
    let mut leaves = Vec::new();
    walk(record, &segments, path, &mut leaves)?;
    Ok(leaves)
}

fn walk(
    value: &Value,
    rest: &[&str],
    path: &str,
    leaves: &mut Vec<String>,
) -> Result<(), IdMapError> {
    match (value, rest.split_first()) {
        (Value::Null, _) => Ok(()),
        (Value::Array(items), _) => {
            for item in items {
                walk(item, rest, path, leaves)?;
            }
            Ok(())
        }
        (Value::Object(map), Some((key, tail))) => match map.get(*key) {
            Some(child) => walk(child, tail, path, leaves),
            None => Ok(()),
        },
        (Value::String(leaf), None) => {
            leaves.push(leaf.clone());
            Ok(())
        }
        (other, Some((key, _))) => Err(IdMapError::RemoteService(format!(
            "unexpected {} where `{key}` of `{path}` was expected",
            json_type(other)
        ))),
        (other, None) => Err(IdMapError::RemoteService(format!(
            "unexpected {} at the end of `{path}`, expected a string",
            json_type(other)
        ))),
    }
}

/// Reads the record's own identifier from `field`, falling back to the GDC `id` key.
pub fn record_id(record: &Value, field: &str) -> Result<String, IdMapError> {
    record
        .get(field)
        .and_then(Value::as_str)
        .or_else(|| record.get("id").and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| IdMapError::RemoteService(format!("hit without `{field}` or `id`")))
}

/// Pairs every record's id with each value found at `path`, preserving order.
pub fn id_value_pairs(
    records: &[Value],
    id_field: &str,
    path: &str,
) -> Result<Vec<(String, String)>, IdMapError> {
    let mut pairs = Vec::new();
    for record in records {
        let id = record_id(record, id_field)?;
        for leaf in extract_leaves(record, path)? {
            pairs.push((id.clone(), leaf));
        }
    }
    Ok(pairs)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
