//! The state tree value type.
//!
//! `Value` is a JSON-shaped tree whose composite variants (`String`, `Array`,
//! `Object`) are `Arc`-backed. Cloning a `Value` bumps reference counts instead
//! of copying subtrees, which is what makes copy-on-path snapshots cheap and
//! makes `Value::ptr_eq` a meaningful identity comparison.

use crate::Path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A numeric value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
}

impl Number {
    /// Create an integer number.
    #[inline]
    pub fn int(v: i64) -> Self {
        Number::Int(v)
    }

    /// Create a floating-point number.
    #[inline]
    pub fn float(v: f64) -> Self {
        Number::Float(v)
    }

    /// Convert to f64.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }

    /// Convert to i64 (truncates floats).
    #[inline]
    pub fn as_i64(&self) -> i64 {
        match self {
            Number::Int(i) => *i,
            Number::Float(f) => *f as i64,
        }
    }

    /// Check if this is an integer.
    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, Number::Int(_))
    }

    /// Check if this is a float.
    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Int(v)
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Number::Int(v as i64)
    }
}

impl From<u32> for Number {
    fn from(v: u32) -> Self {
        Number::Int(v as i64)
    }
}

impl From<u64> for Number {
    fn from(v: u64) -> Self {
        // Values beyond i64::MAX degrade to Float.
        i64::try_from(v)
            .map(Number::Int)
            .unwrap_or(Number::Float(v as f64))
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

impl From<f32> for Number {
    fn from(v: f32) -> Self {
        Number::Float(v as f64)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

/// A nested state tree value.
///
/// Composite variants share their contents through `Arc`, so cloning is cheap
/// and untouched subtrees keep their identity across snapshots.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absent / null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// String value.
    String(Arc<str>),
    /// Ordered sequence. Setters replace arrays wholesale, never per element.
    Array(Arc<Vec<Value>>),
    /// Mapping from field name to value.
    Object(Arc<BTreeMap<String, Value>>),
}

impl Value {
    /// Create an empty object value.
    #[inline]
    pub fn empty_object() -> Self {
        Value::Object(Arc::new(BTreeMap::new()))
    }

    /// Identity comparison.
    ///
    /// Composites of the same variant compare by `Arc` pointer (string values
    /// fall back to content equality); primitives compare by value. This plays
    /// the role reference equality plays in languages with implicit reference
    /// semantics, and it is what keys mirror memoization and what structural
    /// sharing tests assert on.
    pub fn ptr_eq(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Number(x), Value::Number(y)) => x == y,
            (Value::String(x), Value::String(y)) => Arc::ptr_eq(x, y) || x == y,
            (Value::Array(x), Value::Array(y)) => Arc::ptr_eq(x, y),
            (Value::Object(x), Value::Object(y)) => Arc::ptr_eq(x, y),
            _ => false,
        }
    }

    /// The type name of this value.
    #[inline]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Returns true if this is `Null`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this is an object.
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Returns true if this is an array.
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Get the object fields if this is an object.
    #[inline]
    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Get the elements if this is an array.
    #[inline]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get the string content if this is a string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the boolean if this is a bool.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the integer value if this is an integer number.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(Number::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Get the numeric value as f64 if this is a number.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// Get an object field by key.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(key)
    }

    /// Resolve a path against this value.
    #[inline]
    pub fn get_path(&self, path: &Path) -> Option<&Value> {
        crate::update::get_at(self, path)
    }

    /// Deserialize this value into a typed struct.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> crate::NestateResult<T> {
        Ok(serde_json::from_value(serde_json::Value::from(
            self.clone(),
        ))?)
    }

    /// Serialize a typed struct into a value.
    pub fn encode<T: serde::Serialize>(value: &T) -> crate::NestateResult<Value> {
        Ok(Value::from(serde_json::to_value(value)?))
    }

    /// Serialize this value to a JSON string.
    pub fn to_json_string(&self) -> crate::NestateResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize this value to a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> crate::NestateResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a value from a JSON string.
    pub fn from_json_str(s: &str) -> crate::NestateResult<Value> {
        Ok(Value::from(serde_json::from_str::<serde_json::Value>(s)?))
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => items.serialize(serializer),
            Value::Object(fields) => fields.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = serde_json::Value::deserialize(deserializer)?;
        Ok(Value::from(v))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Number(Number::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Number(Number::from(u))
                } else {
                    Value::Number(Number::Float(n.as_f64().unwrap_or(0.0)))
                }
            }
            serde_json::Value::String(s) => Value::String(Arc::from(s.as_str())),
            serde_json::Value::Array(items) => {
                Value::Array(Arc::new(items.into_iter().map(Value::from).collect()))
            }
            serde_json::Value::Object(fields) => Value::Object(Arc::new(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            )),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(Number::Int(i)) => serde_json::Value::Number(i.into()),
            Value::Number(Number::Float(f)) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Array(items) => serde_json::Value::Array(
                items.iter().cloned().map(serde_json::Value::from).collect(),
            ),
            Value::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v.clone())))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(Number::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(Number::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Number(Number::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Number(Number::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(Number::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Number(Number::from(v))
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Arc::from(v.as_str()))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(Arc::new(v))
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Object(Arc::new(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::from(true).kind(), "boolean");
        assert_eq!(Value::from(42i64).kind(), "number");
        assert_eq!(Value::from("hi").kind(), "string");
        assert_eq!(Value::from(json!([1, 2])).kind(), "array");
        assert_eq!(Value::from(json!({"a": 1})).kind(), "object");
    }

    #[test]
    fn test_clone_shares_composites() {
        let v = Value::from(json!({"a": {"b": 1}}));
        let cloned = v.clone();
        assert!(Value::ptr_eq(&v, &cloned));
        assert!(Value::ptr_eq(v.get("a").unwrap(), cloned.get("a").unwrap()));
    }

    #[test]
    fn test_ptr_eq_distinguishes_equal_trees() {
        let a = Value::from(json!({"x": [1, 2]}));
        let b = Value::from(json!({"x": [1, 2]}));
        assert_eq!(a, b);
        assert!(!Value::ptr_eq(&a, &b));
    }

    #[test]
    fn test_ptr_eq_primitives_by_value() {
        assert!(Value::ptr_eq(&Value::from(5i64), &Value::from(5i64)));
        assert!(!Value::ptr_eq(&Value::from(5i64), &Value::from(6i64)));
        assert!(Value::ptr_eq(&Value::Null, &Value::Null));
        assert!(!Value::ptr_eq(&Value::Null, &Value::from(false)));
    }

    #[test]
    fn test_get_field() {
        let v = Value::from(json!({"name": "John", "age": 20}));
        assert_eq!(v.get("name"), Some(&Value::from("John")));
        assert_eq!(v.get("missing"), None);
        assert_eq!(Value::from(1i64).get("name"), None);
    }

    #[test]
    fn test_number_conversions() {
        assert_eq!(Number::from(3i32).as_i64(), 3);
        assert_eq!(Number::from(2.5f64).as_f64(), 2.5);
        assert!(Number::from(1i64).is_int());
        assert!(Number::from(1.0f64).is_float());
        assert!(Number::from(u64::MAX).is_float());
    }

    #[test]
    fn test_json_round_trip() {
        let original = json!({"name": "John", "tags": ["a", "b"], "nested": {"n": 1.5}});
        let value = Value::from(original.clone());
        let back = serde_json::Value::from(value);
        assert_eq!(back, original);
    }

    #[test]
    fn test_serde_round_trip() {
        let value = Value::from(json!({"a": {"b": [1, null, true, "s"]}}));
        let text = value.to_json_string().unwrap();
        let parsed = Value::from_json_str(&text).unwrap();
        assert_eq!(value, parsed);
    }

    #[test]
    fn test_decode_encode() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct User {
            name: String,
            age: i64,
        }

        let user = User {
            name: "Jane".into(),
            age: 30,
        };
        let value = Value::encode(&user).unwrap();
        assert_eq!(value.get("name"), Some(&Value::from("Jane")));
        let decoded: User = value.decode().unwrap();
        assert_eq!(decoded, user);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(Some(1i64)), Value::from(1i64));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }
}
