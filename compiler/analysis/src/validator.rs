//! Schema validation
//!
//! Checks every definition of a snapshot before anything is generated:
//! references resolve, contracts are well formed, and every canonical
//! example satisfies the schema it documents. Problems are collected, not
//! returned one at a time, so an author sees all of them in one run.

use std::collections::BTreeSet;

use registry::{Registries, SchemaRegistry};
use schema::{
    Contract, EndpointDefinition, HelperDefinition, ScalarType, SchemaError, SchemaSnapshot,
    TypeDefinition, TypeKind, Value,
};
use transport::{SELECTOR_FIELD, STATUS_OK, VERSION_FIELD};
use types::TargetLanguage;

/// Per-definition checks against one snapshot's registries.
pub struct SchemaValidator<'a> {
    types: &'a SchemaRegistry,
    helpers: BTreeSet<&'a str>,
    wire_version: &'a str,
}

impl<'a> SchemaValidator<'a> {
    /// Validator over already built registries.
    pub fn new(registries: &'a Registries) -> Self {
        Self {
            types: &registries.types,
            helpers: registries.helpers.iter().map(|h| h.name.as_str()).collect(),
            wire_version: registries.wire_version(),
        }
    }

    fn resolve(&self, location: String, type_name: &str, errors: &mut Vec<SchemaError>) {
        if !self.types.contains(type_name) {
            errors.push(SchemaError::UnresolvedType { location, type_name: type_name.to_string() });
        }
    }

    /// The chain of list items leading from `start` back to it, if any.
    ///
    /// A cycle that does not pass through `start` is left to its own members.
    fn list_cycle(&self, start: &str, item: &str) -> Option<Vec<String>> {
        let mut path = vec![start.to_string()];
        let mut visited = BTreeSet::from([start]);
        let mut next = item;
        loop {
            path.push(next.to_string());
            if next == start {
                return Some(path);
            }
            if !visited.insert(next) {
                return None;
            }
            match self.types.get(next).map(|d| &d.kind) {
                Some(TypeKind::List { item }) => next = item.as_str(),
                _ => return None,
            }
        }
    }

    /// Check one type definition.
    pub fn check_type(&self, def: &TypeDefinition) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        let location = format!("type {}", def.name);
        match &def.kind {
            TypeKind::Scalar { .. } => {}
            TypeKind::Enum { variants } => {
                if variants.is_empty() {
                    errors.push(SchemaError::malformed(&location, "enum has no variants"));
                }
                let mut seen = BTreeSet::new();
                for v in variants {
                    if !seen.insert(v) {
                        errors.push(SchemaError::malformed(&location, format!("duplicate variant `{}`", v)));
                    }
                }
            }
            TypeKind::Record { fields, .. } => {
                let mut seen = BTreeSet::new();
                for f in fields {
                    if !seen.insert(&f.name) {
                        errors.push(SchemaError::malformed(&location, format!("duplicate field `{}`", f.name)));
                    }
                    self.resolve(format!("{} field {}", location, f.name), &f.type_ref, &mut errors);
                }
            }
            TypeKind::List { item } => match self.list_cycle(&def.name, item) {
                Some(path) => errors.push(SchemaError::malformed(
                    &location,
                    format!("list nests itself: {}", path.join(" -> ")),
                )),
                None => self.resolve(format!("{} item", location), item, &mut errors),
            },
            TypeKind::CompositeContract { base, contracts } =>
                for c in contracts {
                    check_contract(&location, *base, c, &mut errors);
                },
        }
        errors
    }

    /// Check one endpoint, its example pair included.
    pub fn check_endpoint(&self, def: &EndpointDefinition) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        let location = format!("endpoint {}", def.name);
        if def.name.trim().is_empty() {
            errors.push(SchemaError::malformed("endpoint", "empty name"));
        }
        if def.dispatch_key.trim().is_empty() {
            errors.push(SchemaError::malformed(&location, "empty dispatch key"));
        }

        let mut seen = BTreeSet::new();
        for p in &def.params {
            let param_location = format!("{} param {}", location, p.name);
            if !seen.insert(&p.name) {
                errors.push(SchemaError::malformed(&location, format!("duplicate param `{}`", p.name)));
            }
            if p.name == SELECTOR_FIELD || p.name == VERSION_FIELD {
                errors.push(SchemaError::malformed(&param_location, "name is reserved for the wire envelope"));
            }
            self.resolve(param_location.clone(), &p.type_ref, &mut errors);
            if let Some(helper) = &p.normalize {
                if !self.helpers.contains(helper.as_str()) {
                    errors.push(SchemaError::malformed(
                        &param_location,
                        format!("unknown normalization helper `{}`", helper),
                    ));
                }
            }
        }
        self.resolve(format!("{} response", location), &def.response, &mut errors);

        let mut codes = BTreeSet::new();
        for e in &def.errors {
            if e.code == STATUS_OK {
                errors.push(SchemaError::malformed(&location, format!("error `{}` uses the success code", e.name)));
            }
            if !codes.insert(e.code) {
                errors.push(SchemaError::malformed(&location, format!("duplicate error code {}", e.code)));
            }
        }

        // Examples are only meaningful once every reference resolves.
        if !errors.is_empty() {
            return errors;
        }
        if let Err(violation) =
            self.types.validate_request(def, &Value::from(&def.example_request), self.wire_version)
        {
            errors.push(SchemaError::ExampleViolation {
                location: format!("{} example_request", location),
                violation,
            });
        }
        if def.example_response.get("Result").and_then(serde_json::Value::as_i64) != Some(STATUS_OK) {
            errors.push(SchemaError::malformed(
                format!("{} example_response", location),
                "example is not a success envelope",
            ));
        } else if let Err(violation) =
            self.types.validate_response(def, &Value::from(&def.example_response))
        {
            errors.push(SchemaError::ExampleViolation {
                location: format!("{} example_response", location),
                violation,
            });
        }
        errors
    }

    /// Check one helper and its test table.
    pub fn check_helper(&self, def: &HelperDefinition) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        let location = format!("helper {}", def.name);

        let mut seen = BTreeSet::new();
        for p in &def.params {
            if !seen.insert(&p.name) {
                errors.push(SchemaError::malformed(&location, format!("duplicate param `{}`", p.name)));
            }
            self.resolve(format!("{} param {}", location, p.name), &p.type_ref, &mut errors);
        }
        if let Some(returns) = &def.returns {
            self.resolve(format!("{} return", location), returns, &mut errors);
        }
        for key in def.implementations.keys() {
            if key.parse::<TargetLanguage>().is_err() {
                errors.push(SchemaError::malformed(&location, format!("override for unknown target `{}`", key)));
            }
        }
        if !errors.is_empty() {
            return errors;
        }

        for (i, case) in def.test_cases.iter().enumerate() {
            let case_location = format!("{} test case {}", location, i);
            if case.inputs.len() != def.params.len() {
                errors.push(SchemaError::malformed(
                    &case_location,
                    format!("{} inputs for {} params", case.inputs.len(), def.params.len()),
                ));
                continue;
            }
            for (input, param) in case.inputs.iter().zip(&def.params) {
                if let Err(violation) = self.types.validate(&Value::from(input), &param.type_ref) {
                    errors.push(SchemaError::ExampleViolation {
                        location: format!("{} input {}", case_location, param.name),
                        violation,
                    });
                }
            }
            match &def.returns {
                Some(returns) => {
                    if let Err(violation) = self.types.validate(&Value::from(&case.expected), returns) {
                        errors.push(SchemaError::ExampleViolation {
                            location: format!("{} expected", case_location),
                            violation,
                        });
                    }
                }
                None => errors.push(SchemaError::malformed(&case_location, "helper returns nothing")),
            }
        }
        errors
    }

    /// Run every check over `registries`.
    pub fn check_all(&self, registries: &Registries) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        for def in registries.types.iter().filter(|d| !registries.types.is_builtin(&d.name)) {
            errors.extend(self.check_type(def));
        }
        for def in registries.endpoints.iter() {
            errors.extend(self.check_endpoint(def));
        }
        for def in registries.helpers.iter() {
            errors.extend(self.check_helper(def));
        }
        errors
    }
}

fn check_contract(location: &str, base: ScalarType, contract: &Contract, errors: &mut Vec<SchemaError>) {
    let string_only = matches!(
        contract,
        Contract::Regex { .. } | Contract::OneOf { .. } | Contract::Prefix { .. }
    );
    let numeric_only = matches!(contract, Contract::Range { .. });
    let numeric = matches!(base, ScalarType::Integer | ScalarType::Number);
    if (string_only && base != ScalarType::String) || (numeric_only && !numeric) {
        errors.push(SchemaError::malformed(
            location,
            format!("{} does not apply to {} values", contract.describe(), base),
        ));
    }
    match contract {
        Contract::Regex { .. } => {
            if let Some((pattern, reason)) = contract.invalid_pattern() {
                errors.push(SchemaError::malformed(location, format!("invalid pattern `{}`: {}", pattern, reason)));
            }
        }
        Contract::LengthIn { min, max } if min > max => {
            errors.push(SchemaError::malformed(location, format!("length bounds {}..{} are empty", min, max)));
        }
        Contract::Range { min: Some(min), max: Some(max) } if min > max => {
            errors.push(SchemaError::malformed(location, format!("range {}..{} is empty", min, max)));
        }
        Contract::All { contracts } =>
            for c in contracts {
                check_contract(location, base, c, errors);
            },
        _ => {}
    }
}

/// Validate a whole snapshot and build its registries.
///
/// Duplicate names are reported first; the registries cannot be built over
/// them, so the remaining checks only run on a duplicate-free snapshot.
pub fn validate_snapshot(snapshot: &SchemaSnapshot) -> Result<Registries, Vec<SchemaError>> {
    let mut errors = Vec::new();

    let mut types = SchemaRegistry::new();
    for def in snapshot.types() {
        if let Err(e) = types.register(def.clone()) {
            errors.push(e);
        }
    }
    let mut names = BTreeSet::new();
    let mut keys = BTreeSet::new();
    for def in snapshot.endpoints() {
        if !names.insert(def.name.as_str()) {
            errors.push(SchemaError::Duplicate { kind: "endpoint", name: def.name.clone() });
        }
        if !keys.insert(def.dispatch_key.as_str()) {
            errors.push(SchemaError::Duplicate { kind: "dispatch key", name: def.dispatch_key.clone() });
        }
    }
    let mut helpers = BTreeSet::new();
    for def in snapshot.helpers() {
        if !helpers.insert(def.name.as_str()) {
            errors.push(SchemaError::Duplicate { kind: "helper", name: def.name.clone() });
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let registries = Registries::from_snapshot(snapshot).map_err(|e| vec![e])?;
    let errors = SchemaValidator::new(&registries).check_all(&registries);
    if errors.is_empty() {
        tracing::debug!(
            types = registries.types.len(),
            endpoints = registries.endpoints.len(),
            helpers = registries.helpers.len(),
            "schema validated"
        );
        Ok(registries)
    } else {
        for e in &errors {
            tracing::warn!(error = %e, "schema error");
        }
        Err(errors)
    }
}
