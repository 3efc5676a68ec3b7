//! Validation contracts
//!
//! Contracts are pure, total predicates over [`Value`]. They compose by logical
//! AND and fail closed: a value the contract does not apply to is a violation.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ContractViolation;
use crate::value::Value;

/// A named predicate a value must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "contract", rename_all = "snake_case")]
pub enum Contract {
    /// String, list or record with at least one element
    NonEmpty,
    /// String matching the pattern
    Regex {
        /// Regular expression (Rust `regex` syntax)
        pattern: String,
    },
    /// String (in chars) or list length within `[min, max]`
    LengthIn {
        /// Inclusive lower bound
        min: usize,
        /// Inclusive upper bound
        max: usize,
    },
    /// Number within the optional bounds
    Range {
        /// Inclusive lower bound
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        /// Inclusive upper bound
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// String equal to one of the listed values
    OneOf {
        /// Allowed values
        values: Vec<String>,
    },
    /// String starting with `prefix`
    Prefix {
        /// Required prefix
        prefix: String,
    },
    /// Conjunction of nested contracts, checked in order
    All {
        /// Nested contracts
        contracts: Vec<Contract>,
    },
}

impl Contract {
    /// Human-readable description used as the `expected` part of a violation.
    pub fn describe(&self) -> String {
        match self {
            Contract::NonEmpty => "non-empty value".to_string(),
            Contract::Regex { pattern } => format!("string matching /{}/", pattern),
            Contract::LengthIn { min, max } => format!("length in [{}, {}]", min, max),
            Contract::Range { min, max } => match (min, max) {
                (Some(lo), Some(hi)) => format!("number in [{}, {}]", lo, hi),
                (Some(lo), None) => format!("number >= {}", lo),
                (None, Some(hi)) => format!("number <= {}", hi),
                (None, None) => "number".to_string(),
            },
            Contract::OneOf { values } => format!("one of [{}]", values.join(", ")),
            Contract::Prefix { prefix } => format!("string starting with {:?}", prefix),
            Contract::All { contracts } =>
                contracts.iter().map(Contract::describe).collect::<Vec<_>>().join(" and "),
        }
    }

    /// Check `value` at `path`. Never panics; an invalid regex is a violation.
    pub fn check(&self, value: &Value, path: &str) -> Result<(), ContractViolation> {
        let violation = |actual: String| ContractViolation::new(path, self.describe(), actual);

        match self {
            Contract::NonEmpty => {
                let empty = match value {
                    Value::String(s) => s.is_empty(),
                    Value::List(items) => items.is_empty(),
                    Value::Record(fields) => fields.is_empty(),
                    other => return Err(violation(other.kind_name().to_string())),
                };
                if empty {
                    return Err(violation(format!("empty {}", value.kind_name())));
                }
                Ok(())
            }
            Contract::Regex { pattern } => {
                let s = value.as_str().ok_or_else(|| violation(value.kind_name().to_string()))?;
                let re = Regex::new(pattern)
                    .map_err(|e| violation(format!("{} (invalid pattern: {})", value, e)))?;
                if re.is_match(s) {
                    Ok(())
                } else {
                    Err(violation(value.to_string()))
                }
            }
            Contract::LengthIn { min, max } => {
                let len = match value {
                    Value::String(s) => s.chars().count(),
                    Value::List(items) => items.len(),
                    other => return Err(violation(other.kind_name().to_string())),
                };
                if (*min..=*max).contains(&len) {
                    Ok(())
                } else {
                    Err(violation(format!("length {}", len)))
                }
            }
            Contract::Range { min, max } => {
                let n = value.as_f64().ok_or_else(|| violation(value.kind_name().to_string()))?;
                if n.is_nan() {
                    return Err(violation("NaN".to_string()));
                }
                let above = min.map_or(true, |lo| n >= lo);
                let below = max.map_or(true, |hi| n <= hi);
                if above && below {
                    Ok(())
                } else {
                    Err(violation(value.to_string()))
                }
            }
            Contract::OneOf { values } => {
                let s = value.as_str().ok_or_else(|| violation(value.kind_name().to_string()))?;
                if values.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(violation(value.to_string()))
                }
            }
            Contract::Prefix { prefix } => {
                let s = value.as_str().ok_or_else(|| violation(value.kind_name().to_string()))?;
                if s.starts_with(prefix.as_str()) {
                    Ok(())
                } else {
                    Err(violation(value.to_string()))
                }
            }
            Contract::All { contracts } => {
                for contract in contracts {
                    contract.check(value, path)?;
                }
                Ok(())
            }
        }
    }

    /// Whether `self` contains a regex that does not compile.
    pub fn invalid_pattern(&self) -> Option<(String, String)> {
        match self {
            Contract::Regex { pattern } =>
                Regex::new(pattern).err().map(|e| (pattern.clone(), e.to_string())),
            Contract::All { contracts } => contracts.iter().find_map(Contract::invalid_pattern),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address_contract() -> Contract {
        Contract::All {
            contracts: vec![
                Contract::NonEmpty,
                Contract::Regex { pattern: "^(0x)?[0-9a-fA-F]+$".to_string() },
                Contract::LengthIn { min: 64, max: 66 },
            ],
        }
    }

    #[test]
    fn address_conjunction_accepts_prefixed_and_bare_hex() {
        let c = address_contract();
        let prefixed = format!("0x{}", "b".repeat(64));
        assert!(c.check(&Value::from(prefixed.as_str()), "$").is_ok());
        assert!(c.check(&Value::from("b".repeat(64).as_str()), "$").is_ok());
    }

    #[test]
    fn address_conjunction_reports_first_failing_conjunct() {
        let c = address_contract();
        let err = c.check(&Value::from(""), "$.Address").expect_err("empty must fail");
        assert_eq!(err.field_path, "$.Address");
        assert_eq!(err.expected, "non-empty value");

        let err = c.check(&Value::from("abcd"), "$.Address").expect_err("short must fail");
        assert_eq!(err.expected, "length in [64, 66]");
        assert_eq!(err.actual, "length 4");
    }

    #[test]
    fn inapplicable_values_fail_closed() {
        let err = Contract::Prefix { prefix: "0x".into() }
            .check(&Value::Integer(7), "$")
            .expect_err("integer has no prefix");
        assert_eq!(err.actual, "integer");
        assert!(Contract::Range { min: Some(0.0), max: None }.check(&Value::from("1"), "$").is_err());
        assert!(Contract::NonEmpty.check(&Value::Null, "$").is_err());
    }

    #[test]
    fn invalid_regex_is_a_violation_not_a_panic() {
        let c = Contract::Regex { pattern: "([".to_string() };
        let err = c.check(&Value::from("abc"), "$.x").expect_err("bad pattern");
        assert!(err.actual.contains("invalid pattern"));
        assert!(c.invalid_pattern().is_some());
        assert!(address_contract().invalid_pattern().is_none());
    }

    #[test]
    fn deserializes_tagged_form() {
        let c: Contract = serde_json::from_str(
            r#"{"contract":"all","contracts":[{"contract":"one_of","values":["MainNet","TestNet"]}]}"#,
        )
        .expect("parse");
        assert!(c.check(&Value::from("MainNet"), "$").is_ok());
        assert!(c.check(&Value::from("DevNet"), "$").is_err());
    }
}
