//! Closed tagged-value type
//!
//! Every value checked against a type definition is first lifted into
//! [`Value`]. Enum members are carried as [`Value::String`] and checked by the
//! enum definition that references them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A schema value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    /// JSON `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Integral number that fits in an `i64`
    Integer(i64),
    /// Any other number
    Number(f64),
    /// String (also used for enum members)
    String(String),
    /// Homogeneous list
    List(Vec<Value>),
    /// Record with sorted keys
    Record(BTreeMap<String, Value>),
}

impl Value {
    /// Short name of the value's shape, used in violation messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Borrow the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric payload widened to `f64`, if the value is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Look up a record field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.get(key),
            _ => None,
        }
    }

    /// Whether the value is `null`.
    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    /// Convert back into a JSON value.
    pub fn to_json(&self) -> serde_json::Value { serde_json::Value::from(self.clone()) }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(map) =>
                Value::Record(map.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self { Value::from(&json) }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::from(i),
            Value::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) =>
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect()),
            Value::Record(fields) => serde_json::Value::Object(
                fields.into_iter().map(|(k, v)| (k, serde_json::Value::from(v))).collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::String(s.to_string()) }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self { Value::Integer(i) }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn lifts_json_numbers_by_width() {
        assert_eq!(Value::from(&json!(42)), Value::Integer(42));
        assert_eq!(Value::from(&json!(1.5)), Value::Number(1.5));
        assert_eq!(Value::from(&json!(u64::MAX)), Value::Number(u64::MAX as f64));
    }

    #[test]
    fn records_keep_sorted_keys_when_lowered() {
        let value = Value::from(&json!({"b": 1, "a": [true, null]}));
        assert_eq!(value.to_json().to_string(), r#"{"a":[true,null],"b":1}"#);
        assert_eq!(value.get("a").map(Value::kind_name), Some("list"));
    }
}
