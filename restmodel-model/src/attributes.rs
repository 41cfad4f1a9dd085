//! Attribute maps and path lookups.

use serde_json::{Map, Value};

/// Ordered attribute map. Iteration follows insertion order.
pub type Attributes = Map<String, Value>;

/// Resolves a dotted property path (e.g. `"author.id"`, `"tags.0"` or
/// `"tags[0]"`) inside an attribute map.
pub fn get_path<'a>(attributes: &'a Attributes, path: &str) -> Option<&'a Value> {
    if let Some(value) = attributes.get(path) {
        return Some(value);
    }

    let mut segments = split_path(path).into_iter();
    let mut current = attributes.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Converts a JSON value into an attribute map, rejecting anything but an object.
pub fn from_value(value: Value) -> crate::ModelResult<Attributes> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(crate::ModelError::InvalidAttributes(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split(['.', '[', ']'])
        .filter(|segment| !segment.is_empty())
        .collect()
}
