//! Ordered field resolution over loosely-structured AI output.
//!
//! Every target field declares its accepted source keys once, as a `KeyChain`.
//! The first key holding a present value wins. `null`, empty strings and empty
//! arrays count as absent. Dotted keys (`links.linkedin`) descend into nested
//! objects.

use serde_json::Value;

/// Source keys for one target field, highest priority first.
pub type KeyChain = &'static [&'static str];

/// Returns the first present value named by `keys`.
pub fn resolve<'a>(obj: &'a Value, keys: KeyChain) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| lookup(obj, key))
        .find(|value| is_present(value))
}

/// Resolves a scalar and renders it as a trimmed string. Numbers are accepted
/// (a GPA often arrives as `3.8`). Anything else yields `""`.
pub fn resolve_str(obj: &Value, keys: KeyChain) -> String {
    keys.iter()
        .filter_map(|key| lookup(obj, key))
        .find_map(scalar_to_string)
        .unwrap_or_default()
}

/// Resolves a list of strings. A lone string is treated as a one-item list.
pub fn resolve_string_list(obj: &Value, keys: KeyChain) -> Vec<String> {
    match resolve(obj, keys) {
        Some(Value::Array(items)) => string_items(items),
        Some(value) => scalar_to_string(value).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Resolves an array, returning an empty slice when absent or not an array.
pub fn resolve_array<'a>(obj: &'a Value, keys: KeyChain) -> &'a [Value] {
    resolve(obj, keys)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Collects the usable strings from an array. Objects contribute their `name`.
pub fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(_) => item.get("name").and_then(scalar_to_string),
            other => scalar_to_string(other),
        })
        .collect()
}

fn lookup<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(obj, |current, part| current.get(part))
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
