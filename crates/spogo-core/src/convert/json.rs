// ── Untyped JSON helpers ──
//
// Lookups and depth-first walks over `serde_json::Value`. The private API
// reports the same field as a number in one response and a numeric string
// in the next, so the scalar getters accept both.

use serde_json::{Map, Value};

pub(crate) type Object = Map<String, Value>;

/// Object at `path` below `value`.
pub(crate) fn object_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Object> {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))?
        .as_object()
}

/// Non-empty string field.
pub(crate) fn str_field<'a>(m: &'a Object, key: &str) -> Option<&'a str> {
    m.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

pub(crate) fn u64_field(m: &Object, key: &str) -> Option<u64> {
    match m.get(key)? {
        Value::Number(n) => n.as_u64().or_else(|| {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::as_conversions
            )]
            n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn bool_field(m: &Object, key: &str) -> Option<bool> {
    match m.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Visit every object below `value`, parents before children.
pub(crate) fn walk_objects<'a>(value: &'a Value, visit: &mut dyn FnMut(&'a Object)) {
    match value {
        Value::Object(m) => walk_object(m, visit),
        Value::Array(items) => {
            for child in items {
                walk_objects(child, visit);
            }
        }
        _ => {}
    }
}

pub(crate) fn walk_object<'a>(m: &'a Object, visit: &mut dyn FnMut(&'a Object)) {
    visit(m);
    for child in m.values() {
        walk_objects(child, visit);
    }
}

/// First object (depth-first) for which `pick` yields a value.
pub(crate) fn find_map<'a, T>(
    value: &'a Value,
    pick: &mut dyn FnMut(&'a Object) -> Option<T>,
) -> Option<T> {
    match value {
        Value::Object(m) => find_in_object(m, pick),
        Value::Array(items) => items.iter().find_map(|child| find_map(child, pick)),
        _ => None,
    }
}

pub(crate) fn find_in_object<'a, T>(
    m: &'a Object,
    pick: &mut dyn FnMut(&'a Object) -> Option<T>,
) -> Option<T> {
    pick(m).or_else(|| m.values().find_map(|child| find_map(child, pick)))
}

/// First `name` or `title` string anywhere below `value`.
pub(crate) fn first_name(value: &Value) -> Option<String> {
    find_map(value, &mut own_name)
}

pub(crate) fn first_name_in(m: &Object) -> Option<String> {
    find_in_object(m, &mut own_name)
}

fn own_name(m: &Object) -> Option<String> {
    str_field(m, "name")
        .or_else(|| str_field(m, "title"))
        .map(str::to_owned)
}

/// Trimmed, non-empty, first-occurrence-wins.
pub(crate) fn dedupe(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim();
        if !value.is_empty() && !out.iter().any(|seen| seen == value) {
            out.push(value.to_owned());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_and_numeric_strings() {
        let v = json!({"a": 12, "b": "340", "c": 1.9, "d": -1, "e": "x"});
        let m = v.as_object().expect("object");
        assert_eq!(u64_field(m, "a"), Some(12));
        assert_eq!(u64_field(m, "b"), Some(340));
        assert_eq!(u64_field(m, "c"), Some(1));
        assert_eq!(u64_field(m, "d"), None);
        assert_eq!(u64_field(m, "e"), None);
    }

    #[test]
    fn path_lookup() {
        let v = json!({"data": {"searchV2": {"tracksV2": {"items": []}}}});
        assert!(object_at(&v, &["data", "searchV2", "tracksV2"]).is_some());
        assert!(object_at(&v, &["data", "searchV2", "albumsV2"]).is_none());
        assert!(object_at(&v, &["data", "searchV2", "tracksV2", "items"]).is_none());
    }

    #[test]
    fn first_name_prefers_own_field() {
        let v = json!({"a": {"name": "inner"}, "title": "outer"});
        assert_eq!(first_name(&v).as_deref(), Some("outer"));
    }

    #[test]
    fn dedupe_keeps_order() {
        let out = dedupe(vec![" A ".into(), "B".into(), "A".into(), String::new()]);
        assert_eq!(out, vec!["A", "B"]);
    }
}
