//! Submitted form data and dot-path addressing.

use serde_json::Value;

/// Values bound to a form, keyed by field name.
pub type FormData = serde_json::Map<String, Value>;

/// Looks up a value by dot-addressed path.
///
/// The literal key is tried first so that flat submissions such as
/// `{"address.city": "Ghent"}` work; otherwise the path is walked through
/// nested objects and arrays (`items.0.sku`).
pub fn lookup<'a>(data: &'a FormData, path: &str) -> Option<&'a Value> {
    if let Some(value) = data.get(path) {
        return Some(value);
    }

    let mut segments = path.split('.');
    let mut current = data.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Returns whether a value counts as "not provided" for `required`.
///
/// Absent, null, whitespace-only strings and empty collections are blank.
/// An unticked checkbox (`false`) is handled by the caller.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s.trim().is_empty(),
        other => is_empty(other),
    }
}

/// Returns whether a value is literally empty: absent, null, `""` or an
/// empty collection. Whitespace is content.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Bool(_) | Value::Number(_)) => false,
    }
}

/// Converts a value to the string used for length checks and rendering.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Interprets a value as a number. Numeric strings are accepted because
/// browsers submit everything as text.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Overlays `input` onto `target`, replacing values key by key.
pub(crate) fn merge(target: &mut FormData, input: FormData) {
    for (key, value) in input {
        target.insert(key, value);
    }
}
