//! Schema Registry and contract validator

use std::collections::BTreeMap;

use schema::{
    ContractViolation, EndpointDefinition, ScalarType, SchemaError, TypeDefinition, TypeKind, Value,
};

/// Name of the field carrying the wire version in every request.
pub const VERSION_FIELD: &str = "Version";

/// Type definitions by name, builtins included.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    types: BTreeMap<String, TypeDefinition>,
    order: Vec<String>,
}

impl Default for SchemaRegistry {
    fn default() -> Self { Self::new() }
}

impl SchemaRegistry {
    /// Create a registry holding only the builtin scalars.
    pub fn new() -> Self {
        let mut registry = Self { types: BTreeMap::new(), order: Vec::new() };
        for scalar in ScalarType::ALL {
            let def = scalar.builtin();
            registry.order.push(def.name.clone());
            registry.types.insert(def.name.clone(), def);
        }
        registry
    }

    /// Build a registry from authored definitions.
    pub fn from_definitions(defs: &[TypeDefinition]) -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        for def in defs {
            registry.register(def.clone())?;
        }
        Ok(registry)
    }

    /// Register one definition. Redefining any name, builtins included, is an error.
    pub fn register(&mut self, def: TypeDefinition) -> Result<(), SchemaError> {
        if self.types.contains_key(&def.name) {
            return Err(SchemaError::Duplicate { kind: "type", name: def.name });
        }
        self.order.push(def.name.clone());
        self.types.insert(def.name.clone(), def);
        Ok(())
    }

    /// Look up a type.
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> { self.types.get(name) }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool { self.types.contains_key(name) }

    /// Whether `name` is one of the builtin scalars.
    pub fn is_builtin(&self, name: &str) -> bool {
        ScalarType::ALL.iter().any(|s| s.builtin_name() == name)
    }

    /// All definitions in registration order (builtins first).
    pub fn iter(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.order.iter().filter_map(|name| self.types.get(name))
    }

    /// Number of registered types, builtins included.
    pub fn len(&self) -> usize { self.types.len() }

    /// Always false: builtins are always present.
    pub fn is_empty(&self) -> bool { self.types.is_empty() }

    /// The scalar a type ultimately carries on the wire, if it is scalar-like.
    pub fn base_scalar(&self, name: &str) -> Option<ScalarType> {
        match &self.get(name)?.kind {
            TypeKind::Scalar { scalar } => Some(*scalar),
            TypeKind::CompositeContract { base, .. } => Some(*base),
            TypeKind::Enum { .. } => Some(ScalarType::String),
            TypeKind::Record { .. } | TypeKind::List { .. } => None,
        }
    }

    /// Validate `value` against `type_name`, returning the value on success.
    pub fn validate<'v>(
        &self,
        value: &'v Value,
        type_name: &str,
    ) -> Result<&'v Value, ContractViolation> {
        self.validate_at(value, type_name, "$")?;
        Ok(value)
    }

    /// Validate `value` against `type_name`, reporting violations under `path`.
    pub fn validate_at(
        &self,
        value: &Value,
        type_name: &str,
        path: &str,
    ) -> Result<(), ContractViolation> {
        let def = self.get(type_name).ok_or_else(|| {
            ContractViolation::new(path, format!("value of known type `{}`", type_name), "unresolved type")
        })?;

        match &def.kind {
            TypeKind::Scalar { scalar } => check_scalar(*scalar, value, path),
            TypeKind::Enum { variants } => match value {
                Value::String(s) if variants.iter().any(|v| v == s) => Ok(()),
                other => Err(ContractViolation::new(
                    path,
                    format!("one of {} variants [{}]", def.name, variants.join(", ")),
                    other.to_string(),
                )),
            },
            TypeKind::Record { fields, additional_fields } => {
                let Value::Record(entries) = value else {
                    return Err(ContractViolation::new(
                        path,
                        format!("record {}", def.name),
                        value.kind_name(),
                    ));
                };
                for field in fields {
                    let field_path = format!("{}.{}", path, field.name);
                    match entries.get(&field.name) {
                        Some(v) if !v.is_null() => self.validate_at(v, &field.type_ref, &field_path)?,
                        _ if field.required => {
                            return Err(ContractViolation::new(
                                field_path,
                                format!("required field of type {}", field.type_ref),
                                "missing",
                            ))
                        }
                        _ => {}
                    }
                }
                if !additional_fields {
                    if let Some(extra) =
                        entries.keys().find(|k| !fields.iter().any(|f| &f.name == *k))
                    {
                        return Err(ContractViolation::new(
                            format!("{}.{}", path, extra),
                            format!("no undeclared fields in record {}", def.name),
                            "undeclared field",
                        ));
                    }
                }
                Ok(())
            }
            TypeKind::List { item } => {
                let Value::List(items) = value else {
                    return Err(ContractViolation::new(
                        path,
                        format!("list of {}", item),
                        value.kind_name(),
                    ));
                };
                for (i, v) in items.iter().enumerate() {
                    self.validate_at(v, item, &format!("{}[{}]", path, i))?;
                }
                Ok(())
            }
            TypeKind::CompositeContract { base, contracts } => {
                check_scalar(*base, value, path)?;
                for contract in contracts {
                    contract.check(value, path)?;
                }
                Ok(())
            }
        }
    }

    /// Validate a request body for `endpoint`.
    ///
    /// The body is a closed record of the endpoint's parameters plus the
    /// `Version` field, which must equal `wire_version`.
    pub fn validate_request(
        &self,
        endpoint: &EndpointDefinition,
        request: &Value,
        wire_version: &str,
    ) -> Result<(), ContractViolation> {
        let Value::Record(entries) = request else {
            return Err(ContractViolation::new("$", "request record", request.kind_name()));
        };

        match entries.get(VERSION_FIELD) {
            Some(Value::String(v)) if v == wire_version => {}
            Some(other) => {
                return Err(ContractViolation::new(
                    format!("$.{}", VERSION_FIELD),
                    format!("wire version {:?}", wire_version),
                    other.to_string(),
                ))
            }
            None => {
                return Err(ContractViolation::new(
                    format!("$.{}", VERSION_FIELD),
                    format!("wire version {:?}", wire_version),
                    "missing",
                ))
            }
        }

        for param in &endpoint.params {
            let field_path = format!("$.{}", param.name);
            match entries.get(&param.name) {
                Some(v) if !v.is_null() => self.validate_at(v, &param.type_ref, &field_path)?,
                _ if param.required => {
                    return Err(ContractViolation::new(
                        field_path,
                        format!("required parameter of type {}", param.type_ref),
                        "missing",
                    ))
                }
                _ => {}
            }
        }

        if let Some(extra) = entries
            .keys()
            .find(|k| k.as_str() != VERSION_FIELD && endpoint.param(k).is_none())
        {
            return Err(ContractViolation::new(
                format!("$.{}", extra),
                format!("a declared parameter of {}", endpoint.name),
                "undeclared parameter",
            ));
        }
        Ok(())
    }

    /// Validate a response envelope for `endpoint`.
    ///
    /// A `Result` of 200 carries a `Response` of the endpoint's response type;
    /// any other code carries an error string.
    pub fn validate_response(
        &self,
        endpoint: &EndpointDefinition,
        envelope: &Value,
    ) -> Result<(), ContractViolation> {
        let Value::Record(entries) = envelope else {
            return Err(ContractViolation::new("$", "response envelope record", envelope.kind_name()));
        };
        if let Some(extra) = entries.keys().find(|k| k.as_str() != "Result" && k.as_str() != "Response")
        {
            return Err(ContractViolation::new(
                format!("$.{}", extra),
                "only Result and Response in the envelope",
                "undeclared field",
            ));
        }
        let code = match entries.get("Result") {
            Some(Value::Integer(code)) => *code,
            Some(other) => {
                return Err(ContractViolation::new("$.Result", "integer result code", other.kind_name()))
            }
            None => return Err(ContractViolation::new("$.Result", "integer result code", "missing")),
        };
        let payload = entries
            .get("Response")
            .ok_or_else(|| ContractViolation::new("$.Response", "response payload", "missing"))?;

        if code == 200 {
            self.validate_at(payload, &endpoint.response, "$.Response")
        } else {
            check_scalar(ScalarType::String, payload, "$.Response")
        }
    }
}

fn check_scalar(scalar: ScalarType, value: &Value, path: &str) -> Result<(), ContractViolation> {
    let ok = match scalar {
        ScalarType::String => matches!(value, Value::String(_)),
        ScalarType::Integer => matches!(value, Value::Integer(_)),
        ScalarType::Number => match value {
            Value::Integer(_) => true,
            Value::Number(n) => n.is_finite(),
            _ => false,
        },
        ScalarType::Boolean => matches!(value, Value::Bool(_)),
        ScalarType::Any => true,
    };
    if ok {
        Ok(())
    } else {
        Err(ContractViolation::new(path, scalar.to_string(), value.kind_name()))
    }
}
