//! JSON values as target source literals
//!
//! Scalars become native literals of the parameter's type token; anything
//! else is decoded at runtime from its JSON text.

use serde_json::Value;

/// A double-quoted string literal valid in all four targets.
pub fn quote(s: &str) -> String { Value::String(s.to_string()).to_string() }

/// Python expression for `value`.
pub fn python(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        compound => format!("json.loads({})", quote(&compound.to_string())),
    }
}

/// TypeScript expression for `value`; JSON is already valid syntax.
pub fn typescript(value: &Value) -> String { value.to_string() }

/// Go expression of type `token` for `value`.
pub fn go(value: &Value, token: &str) -> String {
    match (value, token) {
        (Value::String(s), "string") => quote(s),
        (Value::Number(n), "int64") => format!("int64({})", n),
        (Value::Number(n), "float64") => format!("float64({})", n),
        (Value::Bool(b), "bool") => b.to_string(),
        (Value::Null, _) => "nil".to_string(),
        (other, token) => format!("decode[{}](t, {})", token, quote(&other.to_string())),
    }
}

/// Java expression of type `token` for `value`.
pub fn java(value: &Value, token: &str) -> String {
    match (value, token) {
        (Value::String(s), "String") => quote(s),
        (Value::Number(n), "Long") => format!("{}L", n),
        (Value::Number(n), "Double") => format!("{}d", n),
        (Value::Bool(b), "Boolean") => b.to_string(),
        (Value::Null, _) => "null".to_string(),
        (other, token) =>
            format!("decode({}, new TypeReference<{}>() {{}})", quote(&other.to_string()), token),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_python_literals() {
        assert_eq!(python(&json!(null)), "None");
        assert_eq!(python(&json!(true)), "True");
        assert_eq!(python(&json!("0x1234")), "\"0x1234\"");
        assert_eq!(python(&json!({"a": 1})), r#"json.loads("{\"a\":1}")"#);
    }

    #[test]
    fn test_go_literals_are_typed() {
        assert_eq!(go(&json!(5), "int64"), "int64(5)");
        assert_eq!(go(&json!("MainNet"), "string"), "\"MainNet\"");
        assert_eq!(go(&json!(["a"]), "[]string"), r#"decode[[]string](t, "[\"a\"]")"#);
    }

    #[test]
    fn test_java_literals_are_boxed() {
        assert_eq!(java(&json!(12345), "Long"), "12345L");
        assert_eq!(java(&json!(1.5), "Double"), "1.5d");
        assert_eq!(java(&json!(null), "String"), "null");
    }
}
