//! Path update engine: copy-on-path immutable updates.
//!
//! These are pure functions over `&Value`. Each produces a new snapshot that
//! is structurally distinct from the root down to the updated field, while
//! every sibling subtree keeps the same `Arc` as the input snapshot. That
//! structural sharing is what makes `Value::ptr_eq` change detection valid
//! downstream.

use crate::{NestateResult, Path, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Set a value at a path (pure function).
///
/// The root path replaces the whole snapshot. Otherwise the ancestor chain
/// along `path` is shallow-copied and the terminal key is inserted or
/// overwritten. Traversal is permissive: a missing or non-object intermediate
/// is replaced by an empty object and the walk continues, and missing
/// terminal keys are simply created. `set_at` has no error paths.
///
/// # Examples
///
/// ```
/// use nestate::{path, set_at, Value};
/// use serde_json::json;
///
/// let snapshot = Value::from(json!({"a": {"b": {"c": 10}}, "name": "John"}));
/// let next = set_at(&snapshot, &path!("a", "b", "c"), Value::from(11));
///
/// assert_eq!(next.get_path(&path!("a", "b", "c")), Some(&Value::from(11)));
/// // Siblings off the path keep their identity.
/// assert!(Value::ptr_eq(
///     snapshot.get("name").unwrap(),
///     next.get("name").unwrap(),
/// ));
/// ```
pub fn set_at(snapshot: &Value, path: &Path, value: Value) -> Value {
    if path.is_empty() {
        return value;
    }

    let mut root = shallow_fields(snapshot);
    set_in_fields(&mut root, path.segments(), value);
    Value::Object(Arc::new(root))
}

/// Update the value at a path with a function (pure).
///
/// `f` receives the current value at `path`, or `Value::Null` when the path
/// does not resolve. The root path maps the whole snapshot.
pub fn update_at<F>(snapshot: &Value, path: &Path, f: F) -> Value
where
    F: FnOnce(&Value) -> Value,
{
    if path.is_empty() {
        return f(snapshot);
    }

    let current = get_at(snapshot, path).unwrap_or(&Value::Null);
    let new_value = f(current);
    set_at(snapshot, path, new_value)
}

/// Update the value at a path with a fallible function (pure).
///
/// A failing updater aborts the whole computation: the error propagates and
/// the caller's snapshot is unchanged. Nothing is partially committed.
pub fn try_update_at<F>(snapshot: &Value, path: &Path, f: F) -> NestateResult<Value>
where
    F: FnOnce(&Value) -> NestateResult<Value>,
{
    if path.is_empty() {
        return f(snapshot);
    }

    let current = get_at(snapshot, path).unwrap_or(&Value::Null);
    let new_value = f(current)?;
    Ok(set_at(snapshot, path, new_value))
}

/// Get a reference to the value at a path (for reading).
pub fn get_at<'a>(snapshot: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = snapshot;
    for key in path.iter() {
        current = current.get(key)?;
    }
    Some(current)
}

/// Shallow copy of a value's object fields; non-objects yield an empty map.
///
/// The copy is O(fields) over cheap `Value` handles, so every subtree keeps
/// its `Arc` identity.
fn shallow_fields(value: &Value) -> BTreeMap<String, Value> {
    match value {
        Value::Object(fields) => (**fields).clone(),
        _ => BTreeMap::new(),
    }
}

fn set_in_fields(fields: &mut BTreeMap<String, Value>, keys: &[String], value: Value) {
    match keys {
        [] => {}
        [key] => {
            fields.insert(key.clone(), value);
        }
        [key, rest @ ..] => {
            let mut child = fields.get(key).map(shallow_fields).unwrap_or_default();
            set_in_fields(&mut child, rest, value);
            fields.insert(key.clone(), Value::Object(Arc::new(child)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{path, NestateError};
    use serde_json::json;

    #[test]
    fn test_set_at_terminal_key() {
        let doc = Value::from(json!({"name": "John", "age": 20}));
        let next = set_at(&doc, &path!("name"), Value::from("Jane"));
        assert_eq!(next, Value::from(json!({"name": "Jane", "age": 20})));
        // Original unchanged (pure function).
        assert_eq!(doc.get("name"), Some(&Value::from("John")));
    }

    #[test]
    fn test_set_at_root_replaces_snapshot() {
        let doc = Value::from(json!({"a": 1}));
        let replacement = Value::from(json!({"b": 2}));
        let next = set_at(&doc, &Path::root(), replacement.clone());
        assert!(Value::ptr_eq(&next, &replacement));
    }

    #[test]
    fn test_set_at_preserves_sibling_identity() {
        let doc = Value::from(json!({"a": {"b": {"c": 10}}, "other": {"x": 1}}));
        let next = set_at(&doc, &path!("a", "b", "c"), Value::from(11));

        assert_eq!(next.get_path(&path!("a", "b", "c")), Some(&Value::from(11)));
        assert!(Value::ptr_eq(
            doc.get("other").unwrap(),
            next.get("other").unwrap(),
        ));
        // The ancestor chain along the path is newly allocated.
        assert!(!Value::ptr_eq(&doc, &next));
        assert!(!Value::ptr_eq(doc.get("a").unwrap(), next.get("a").unwrap()));
        assert!(!Value::ptr_eq(
            doc.get_path(&path!("a", "b")).unwrap(),
            next.get_path(&path!("a", "b")).unwrap(),
        ));
    }

    #[test]
    fn test_set_at_creates_missing_intermediates() {
        let doc = Value::from(json!({}));
        let next = set_at(&doc, &path!("a", "b", "c"), Value::from(42));
        assert_eq!(next.get_path(&path!("a", "b", "c")), Some(&Value::from(42)));
    }

    #[test]
    fn test_set_at_overwrites_non_object_intermediate() {
        let doc = Value::from(json!({"a": 5}));
        let next = set_at(&doc, &path!("a", "b"), Value::from(1));
        assert_eq!(next.get_path(&path!("a", "b")), Some(&Value::from(1)));
    }

    #[test]
    fn test_set_at_on_non_object_root() {
        let doc = Value::from(7i64);
        let next = set_at(&doc, &path!("x"), Value::from(1));
        assert_eq!(next, Value::from(json!({"x": 1})));
    }

    #[test]
    fn test_update_at_applies_function_to_previous() {
        let doc = Value::from(json!({"count": 5}));
        let next = update_at(&doc, &path!("count"), |prev| {
            Value::from(prev.as_i64().unwrap_or(0) + 1)
        });
        assert_eq!(next.get("count"), Some(&Value::from(6)));
    }

    #[test]
    fn test_update_at_missing_path_sees_null() {
        let doc = Value::from(json!({}));
        let next = update_at(&doc, &path!("missing"), |prev| {
            assert!(prev.is_null());
            Value::from("created")
        });
        assert_eq!(next.get("missing"), Some(&Value::from("created")));
    }

    #[test]
    fn test_update_at_root_maps_whole_snapshot() {
        let doc = Value::from(json!({"n": 1}));
        let next = update_at(&doc, &Path::root(), |prev| {
            set_at(prev, &path!("n"), Value::from(2))
        });
        assert_eq!(next.get("n"), Some(&Value::from(2)));
    }

    #[test]
    fn test_try_update_at_propagates_error() {
        let doc = Value::from(json!({"count": 5}));
        let result = try_update_at(&doc, &path!("count"), |_| {
            Err(NestateError::update_aborted(path!("count"), "refused"))
        });
        assert!(matches!(result, Err(NestateError::UpdateAborted { .. })));
        // Input untouched.
        assert_eq!(doc.get("count"), Some(&Value::from(5)));
    }

    #[test]
    fn test_try_update_at_success() {
        let doc = Value::from(json!({"count": 5}));
        let next = try_update_at(&doc, &path!("count"), |prev| {
            Ok(Value::from(prev.as_i64().unwrap_or(0) * 2))
        })
        .unwrap();
        assert_eq!(next.get("count"), Some(&Value::from(10)));
    }

    #[test]
    fn test_get_at() {
        let doc = Value::from(json!({"a": {"b": {"c": 42}}}));
        assert_eq!(get_at(&doc, &path!("a", "b", "c")), Some(&Value::from(42)));
        assert_eq!(get_at(&doc, &path!("a", "x")), None);
        assert!(Value::ptr_eq(get_at(&doc, &Path::root()).unwrap(), &doc));
    }

    #[test]
    fn test_set_at_whole_array_replacement() {
        let doc = Value::from(json!({"items": [1, 2], "other": [3]}));
        let next = set_at(&doc, &path!("items"), Value::from(json!([9])));
        assert_eq!(next.get("items"), Some(&Value::from(json!([9]))));
        assert!(Value::ptr_eq(
            doc.get("other").unwrap(),
            next.get("other").unwrap(),
        ));
    }
}
