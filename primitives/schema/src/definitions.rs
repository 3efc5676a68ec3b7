//! Type, endpoint and helper definitions

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::contract::Contract;

fn default_true() -> bool { true }

/// Builtin scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Integer,
    /// Floating point or integral number
    Number,
    /// Boolean
    Boolean,
    /// Any JSON value
    Any,
}

impl ScalarType {
    /// All scalars, in registration order.
    pub const ALL: [ScalarType; 5] = [
        ScalarType::String,
        ScalarType::Integer,
        ScalarType::Number,
        ScalarType::Boolean,
        ScalarType::Any,
    ];

    /// Name under which the scalar is registered as a builtin type.
    pub fn builtin_name(&self) -> &'static str {
        match self {
            ScalarType::String => "String",
            ScalarType::Integer => "Integer",
            ScalarType::Number => "Number",
            ScalarType::Boolean => "Boolean",
            ScalarType::Any => "Any",
        }
    }

    /// The builtin type definition for this scalar.
    pub fn builtin(&self) -> TypeDefinition {
        TypeDefinition {
            name: self.builtin_name().to_string(),
            description: format!("builtin {} scalar", self),
            kind: TypeKind::Scalar { scalar: *self },
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScalarType::String => "string",
            ScalarType::Integer => "integer",
            ScalarType::Number => "number",
            ScalarType::Boolean => "boolean",
            ScalarType::Any => "any",
        };
        f.write_str(s)
    }
}

/// A named type with its validation predicate(s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Unique type name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Shape of the type
    #[serde(flatten)]
    pub kind: TypeKind,
}

/// Shape of a [`TypeDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    /// A builtin scalar
    Scalar {
        /// Scalar kind
        scalar: ScalarType,
    },
    /// Closed set of string variants
    Enum {
        /// Allowed variants, in declaration order
        variants: Vec<String>,
    },
    /// Record with ordered fields
    Record {
        /// Declared fields
        fields: Vec<FieldDef>,
        /// Whether undeclared fields are accepted
        #[serde(default)]
        additional_fields: bool,
    },
    /// Homogeneous list of a named item type
    List {
        /// Item type reference
        item: String,
    },
    /// Scalar base constrained by a conjunction of contracts
    CompositeContract {
        /// Base scalar
        base: ScalarType,
        /// Contracts, composed by logical AND
        contracts: Vec<Contract>,
    },
}

impl TypeKind {
    /// Lowercase kind tag (`scalar`, `enum`, `record`, `list`, `composite_contract`).
    pub fn tag(&self) -> &'static str {
        match self {
            TypeKind::Scalar { .. } => "scalar",
            TypeKind::Enum { .. } => "enum",
            TypeKind::Record { .. } => "record",
            TypeKind::List { .. } => "list",
            TypeKind::CompositeContract { .. } => "composite_contract",
        }
    }
}

/// A record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Wire name
    pub name: String,
    /// Type reference
    #[serde(rename = "type")]
    pub type_ref: String,
    /// Whether the field must be present
    #[serde(default = "default_true")]
    pub required: bool,
    /// Free-form description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// An endpoint or helper parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDef {
    /// Canonical (wire) name
    pub name: String,
    /// Type reference
    #[serde(rename = "type")]
    pub type_ref: String,
    /// Whether the parameter must be supplied
    #[serde(default = "default_true")]
    pub required: bool,
    /// Helper applied to the argument before it goes on the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalize: Option<String>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// A declared error of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDef {
    /// `Result` code carried in the envelope
    pub code: i64,
    /// Canonical error name
    pub name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// One API operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointDefinition {
    /// Canonical operation name (e.g. `checkWallet`)
    pub name: String,
    /// Category (wallet, transaction, block, ...)
    pub category: String,
    /// Operation selector value carried in the request body
    pub dispatch_key: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Ordered request parameters
    #[serde(default)]
    pub params: Vec<ParamDef>,
    /// Type reference of the `Response` payload
    pub response: String,
    /// Declared errors
    #[serde(default)]
    pub errors: Vec<ErrorDef>,
    /// Canonical request body (without the operation selector)
    pub example_request: serde_json::Value,
    /// Canonical response envelope
    pub example_response: serde_json::Value,
}

impl EndpointDefinition {
    /// The canonical response text.
    ///
    /// Every consumer (mock route table, integration tests, documentation)
    /// uses this function, so the served and asserted texts cannot diverge.
    pub fn response_text(&self) -> String { self.example_response.to_string() }

    /// The canonical request text.
    pub fn request_text(&self) -> String { self.example_request.to_string() }

    /// The `Response` payload of the example envelope.
    pub fn example_payload(&self) -> Option<&serde_json::Value> {
        self.example_response.get("Response")
    }

    /// Look up a parameter by canonical name.
    pub fn param(&self, name: &str) -> Option<&ParamDef> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Iterate required parameters in declaration order.
    pub fn required_params(&self) -> impl Iterator<Item = &ParamDef> {
        self.params.iter().filter(|p| p.required)
    }
}

/// Helper categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelperCategory {
    /// Hashing, keys, signatures
    Crypto,
    /// Hex and string conversions
    Encoding,
    /// Client configuration accessors
    Config,
    /// Everything else
    Misc,
}

impl fmt::Display for HelperCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HelperCategory::Crypto => "crypto",
            HelperCategory::Encoding => "encoding",
            HelperCategory::Config => "config",
            HelperCategory::Misc => "misc",
        };
        f.write_str(s)
    }
}

/// One row of a helper's test table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelperTestCase {
    /// Positional arguments
    pub inputs: Vec<serde_json::Value>,
    /// Expected return value
    pub expected: serde_json::Value,
}

/// A cross-cutting utility method present on every SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelperDefinition {
    /// Canonical name (e.g. `hexFix`)
    pub name: String,
    /// Category
    pub category: HelperCategory,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Ordered parameters
    #[serde(default)]
    pub params: Vec<ParamDef>,
    /// Return type reference; `None` for helpers that only update client state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    /// Per-target implementation overrides, keyed by target id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub implementations: BTreeMap<String, String>,
    /// Unit-test table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_cases: Vec<HelperTestCase>,
}

impl HelperDefinition {
    /// The snapshot override for `target`, if one is present.
    pub fn override_for(&self, target: &str) -> Option<&str> {
        self.implementations.get(target).map(String::as_str)
    }
}
