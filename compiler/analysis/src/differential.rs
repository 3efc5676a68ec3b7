//! Differential comparison of decoded values
//!
//! Compares two JSON values field by field and reports every leaf that
//! differs. Used to compare what each SDK decoded for the same request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A specific difference found between two values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    /// Path of the differing field (`exists`, `Transactions[0].ID`); empty for the root
    pub field_path: String,
    /// Value on the expected side, `None` when absent
    pub expected: Option<Value>,
    /// Value on the actual side, `None` when absent
    pub actual: Option<Value>,
}

impl std::fmt::Display for Difference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |v: &Option<Value>| v.as_ref().map_or("<absent>".to_string(), Value::to_string);
        let path = if self.field_path.is_empty() { "<root>" } else { &self.field_path };
        write!(f, "{}: expected {}, got {}", path, show(&self.expected), show(&self.actual))
    }
}

/// Numbers compare by value, so `5` and `5.0` are equal.
fn leaf_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// Recursively compare two JSON values and return differences.
pub fn compare_values(expected: &Value, actual: &Value) -> Vec<Difference> {
    let mut differences = Vec::new();
    compare_at(expected, actual, "", &mut differences);
    differences
}

fn compare_at(expected: &Value, actual: &Value, path: &str, out: &mut Vec<Difference>) {
    match (expected, actual) {
        (Value::Object(map_a), Value::Object(map_b)) => {
            let keys: std::collections::BTreeSet<&String> = map_a.keys().chain(map_b.keys()).collect();
            for key in keys {
                let field_path = join(path, key);
                match (map_a.get(key), map_b.get(key)) {
                    (Some(a), Some(b)) => compare_at(a, b, &field_path, out),
                    (a, b) => out.push(Difference {
                        field_path,
                        expected: a.cloned(),
                        actual: b.cloned(),
                    }),
                }
            }
        }
        (Value::Array(arr_a), Value::Array(arr_b)) =>
            if arr_a.len() != arr_b.len() {
                out.push(Difference {
                    field_path: join(path, "length"),
                    expected: Some(Value::from(arr_a.len())),
                    actual: Some(Value::from(arr_b.len())),
                });
            } else {
                for (i, (a, b)) in arr_a.iter().zip(arr_b).enumerate() {
                    compare_at(a, b, &format!("{}[{}]", path, i), out);
                }
            },
        (a, b) =>
            if !leaf_eq(a, b) {
                out.push(Difference {
                    field_path: path.to_string(),
                    expected: Some(a.clone()),
                    actual: Some(b.clone()),
                });
            },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_equal_values_have_no_differences() {
        let v = json!({"exists": true, "Balance": 12.5, "List": [1, 2]});
        assert!(compare_values(&v, &v).is_empty());
    }

    #[test]
    fn test_numbers_compare_by_value() {
        assert!(compare_values(&json!({"Nonce": 5}), &json!({"Nonce": 5.0})).is_empty());
    }

    #[test]
    fn test_reports_leaf_and_missing_fields() {
        let diffs = compare_values(
            &json!({"exists": true, "Asset": "CIRX"}),
            &json!({"exists": false, "Extra": 1}),
        );
        let paths: Vec<&str> = diffs.iter().map(|d| d.field_path.as_str()).collect();
        assert_eq!(paths, ["Asset", "Extra", "exists"]);
        assert_eq!(diffs[0].actual, None);
        assert_eq!(diffs[1].expected, None);
        assert_eq!(diffs[2].to_string(), "exists: expected true, got false");
    }

    #[test]
    fn test_nested_paths() {
        let diffs = compare_values(
            &json!({"Blocks": [{"Height": 1}, {"Height": 2}]}),
            &json!({"Blocks": [{"Height": 1}, {"Height": 3}]}),
        );
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].field_path, "Blocks[1].Height");
    }
}
