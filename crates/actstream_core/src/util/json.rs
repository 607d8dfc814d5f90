//! JSON tree primitives shared by both conversion directions.
//!
//! # Responsibility
//! - Normalize "absent | single value | list" fields into lists.
//! - Trim null/empty values so converted trees stay minimal.
//!
//! # Invariants
//! - `get_list` never mutates its input.
//! - `trim_nulls` keeps `false` and `0`; only null, "", [] and {} are removed.

use serde_json::{Map, Value};

/// String-keyed JSON mapping used for every activity/object tree.
pub type Object = Map<String, Value>;

/// Returns the value at `key` normalized to a list of borrowed elements.
///
/// Absent or null -> empty, list -> its elements, anything else -> one element.
pub fn get_list<'a>(obj: &'a Object, key: &str) -> Vec<&'a Value> {
    match obj.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

/// Removes `key` and returns its value normalized to an owned list.
pub fn pop_list(obj: &mut Object, key: &str) -> Vec<Value> {
    match obj.remove(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => vec![other],
    }
}

/// Returns the first element of [`get_list`], if any.
pub fn get_first<'a>(obj: &'a Object, key: &str) -> Option<&'a Value> {
    get_list(obj, key).into_iter().next()
}

/// Returns whether a value counts as "nothing" for conversion entry points.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Returns whether a value is removed by [`trim_nulls`].
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Recursively removes null, empty-string, empty-list and empty-mapping values.
///
/// List elements that trim down to nothing are dropped as well.
pub fn trim_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(trim_object(map)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(trim_nulls)
                .filter(|item| !is_empty(item))
                .collect(),
        ),
        other => other,
    }
}

/// [`trim_nulls`] for a mapping, keeping the mapping type.
pub fn trim_object(map: Object) -> Object {
    map.into_iter()
        .map(|(key, value)| (key, trim_nulls(value)))
        .filter(|(_, value)| !is_empty(value))
        .collect()
}

/// Returns a short JSON kind name for diagnostics.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deduplicates strings, keeping the first occurrence order.
pub fn dedupe<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{dedupe, get_list, is_falsy, pop_list, trim_nulls, Object};
    use serde_json::{json, Value};

    fn object(value: Value) -> Object {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    #[test]
    fn get_list_normalizes_absent_single_and_list() {
        let obj = object(json!({"one": "a", "many": ["a", "b"], "none": null}));
        assert!(get_list(&obj, "missing").is_empty());
        assert!(get_list(&obj, "none").is_empty());
        assert_eq!(get_list(&obj, "one"), vec![&json!("a")]);
        assert_eq!(get_list(&obj, "many").len(), 2);
        assert!(obj.contains_key("one"), "get_list must not remove keys");
    }

    #[test]
    fn pop_list_removes_key() {
        let mut obj = object(json!({"tag": {"name": "x"}}));
        let tags = pop_list(&mut obj, "tag");
        assert_eq!(tags, vec![json!({"name": "x"})]);
        assert!(!obj.contains_key("tag"));
        assert!(pop_list(&mut obj, "tag").is_empty());
    }

    #[test]
    fn trim_nulls_drops_empty_values_recursively() {
        let trimmed = trim_nulls(json!({
            "a": null,
            "b": "",
            "c": [],
            "d": {"e": null},
            "f": [{"g": ""}, "keep"],
            "h": false,
            "i": 0
        }));
        assert_eq!(trimmed, json!({"f": ["keep"], "h": false, "i": 0}));
    }

    #[test]
    fn falsy_values_match_empty_inputs() {
        for value in [json!(null), json!(false), json!(0), json!(""), json!([]), json!({})] {
            assert!(is_falsy(&value), "{value} should be falsy");
        }
        assert!(!is_falsy(&json!("x")));
        assert!(!is_falsy(&json!(1)));
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let values = dedupe(["b", "a", "b", ""].iter().map(|s| s.to_string()));
        assert_eq!(values, vec!["b".to_string(), "a".to_string()]);
    }
}
