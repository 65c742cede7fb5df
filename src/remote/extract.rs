use crate::form::FieldOption;
use crate::value::{is_truthy, lookup_path, to_text};
use serde_json::Value;

const LABEL_KEYS: [&str; 3] = ["label", "name", "title"];
const VALUE_KEYS: [&str; 3] = ["value", "id", "code"];

/// Text used when a label or value cannot be found on an element.
const MISSING: &str = "undefined";

/// Turns an arbitrary response payload into a list of options.
///
/// `path` is a dot path to the array inside the payload. Elements that are
/// plain strings become `{label: s, value: s}`; objects are read through
/// `label_key` / `value_key` (dot paths) or, when those are not given, the
/// first truthy of `label`/`name`/`title` and `value`/`id`/`code`.
///
/// This never fails. Anything that does not look like a list of options
/// yields an empty list.
pub fn extract_options(
    response: Option<&Value>,
    path: Option<&str>,
    label_key: Option<&str>,
    value_key: Option<&str>,
) -> Vec<FieldOption> {
    let Some(root) = response.filter(|v| !v.is_null()) else {
        return Vec::new();
    };

    let node = match path.filter(|p| !p.is_empty()) {
        Some(path) => match lookup_path(root, path) {
            Some(node) if is_truthy(node) => node,
            _ => return Vec::new(),
        },
        None => root,
    };

    let Value::Array(items) = node else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => FieldOption::new(s.clone(), s.clone()),
            _ => FieldOption {
                label: resolve(item, label_key, &LABEL_KEYS),
                value: resolve(item, value_key, &VALUE_KEYS),
            },
        })
        .collect()
}

fn resolve(item: &Value, key: Option<&str>, fallbacks: &[&str]) -> String {
    let found = match key {
        Some(key) => lookup_path(item, key),
        None => fallbacks
            .iter()
            .filter_map(|k| item.get(*k))
            .find(|v| is_truthy(v)),
    };
    found.map(to_text).unwrap_or_else(|| MISSING.to_string())
}
