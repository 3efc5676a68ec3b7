//! OpenAPI 3.0 document of the catalog
//!
//! The wire has a single path; operations are told apart by the selector in
//! the body. Each operation is therefore published under a virtual path
//! `/operations/{name}` carrying `x-operation-selector`.

use registry::Registries;
use schema::{Contract, EndpointDefinition, ScalarType, TypeDefinition, TypeKind};
use serde_json::{json, Map, Value};
use transport::{SELECTOR_FIELD, VERSION_FIELD};

use crate::artifact::{ArtifactKind, GeneratedArtifact};
use crate::context::GenerationContext;
use crate::model::DEFAULT_NAG_URL;

/// Relative path of the document.
pub const OPENAPI_PATH: &str = "openapi.json";

fn schema_ref(type_name: &str) -> Value { json!({ "$ref": format!("#/components/schemas/{}", type_name) }) }

fn scalar_schema(scalar: ScalarType) -> Map<String, Value> {
    let mut out = Map::new();
    let ty = match scalar {
        ScalarType::String => "string",
        ScalarType::Integer => "integer",
        ScalarType::Number => "number",
        ScalarType::Boolean => "boolean",
        ScalarType::Any => return out,
    };
    out.insert("type".into(), json!(ty));
    out
}

fn apply_contract(out: &mut Map<String, Value>, contract: &Contract) {
    match contract {
        Contract::NonEmpty => {
            out.entry("minLength").or_insert(json!(1));
        }
        Contract::Regex { pattern } => {
            out.insert("pattern".into(), json!(pattern));
        }
        Contract::LengthIn { min, max } => {
            out.insert("minLength".into(), json!(min));
            out.insert("maxLength".into(), json!(max));
        }
        Contract::Range { min, max } => {
            if let Some(min) = min {
                out.insert("minimum".into(), json!(min));
            }
            if let Some(max) = max {
                out.insert("maximum".into(), json!(max));
            }
        }
        Contract::OneOf { values } => {
            out.insert("enum".into(), json!(values));
        }
        Contract::Prefix { prefix } => {
            out.insert("x-prefix".into(), json!(prefix));
        }
        Contract::All { contracts } =>
            for c in contracts {
                apply_contract(out, c);
            },
    }
}

/// JSON Schema object of one type definition.
pub fn type_schema(def: &TypeDefinition) -> Value {
    let mut out = match &def.kind {
        TypeKind::Scalar { scalar } => scalar_schema(*scalar),
        TypeKind::CompositeContract { base, contracts } => {
            let mut out = scalar_schema(*base);
            for c in contracts {
                apply_contract(&mut out, c);
            }
            out
        }
        TypeKind::Enum { variants } => {
            let mut out = scalar_schema(ScalarType::String);
            out.insert("enum".into(), json!(variants));
            out
        }
        TypeKind::Record { fields, additional_fields } => {
            let mut out = Map::new();
            out.insert("type".into(), json!("object"));
            let properties: Map<String, Value> =
                fields.iter().map(|f| (f.name.clone(), schema_ref(&f.type_ref))).collect();
            out.insert("properties".into(), Value::Object(properties));
            let required: Vec<&str> =
                fields.iter().filter(|f| f.required).map(|f| f.name.as_str()).collect();
            if !required.is_empty() {
                out.insert("required".into(), json!(required));
            }
            out.insert("additionalProperties".into(), json!(additional_fields));
            out
        }
        TypeKind::List { item } => {
            let mut out = Map::new();
            out.insert("type".into(), json!("array"));
            out.insert("items".into(), schema_ref(item));
            out
        }
    };
    if !def.description.is_empty() {
        out.insert("description".into(), json!(def.description));
    }
    Value::Object(out)
}

fn request_schema(endpoint: &EndpointDefinition, wire_version: &str) -> Value {
    let mut properties = Map::new();
    properties.insert(SELECTOR_FIELD.into(), json!({ "type": "string", "enum": [endpoint.dispatch_key] }));
    properties.insert(VERSION_FIELD.into(), json!({ "type": "string", "enum": [wire_version] }));
    let mut required = vec![SELECTOR_FIELD.to_string(), VERSION_FIELD.to_string()];
    for p in &endpoint.params {
        let mut schema = schema_ref(&p.type_ref);
        if !p.description.is_empty() {
            schema = json!({ "allOf": [schema], "description": p.description });
        }
        properties.insert(p.name.clone(), schema);
        if p.required {
            required.push(p.name.clone());
        }
    }
    json!({ "type": "object", "properties": properties, "required": required })
}

fn operation(endpoint: &EndpointDefinition, wire_version: &str) -> Value {
    let mut example = endpoint.example_request.clone();
    if let Value::Object(map) = &mut example {
        map.insert(SELECTOR_FIELD.into(), json!(endpoint.dispatch_key));
    }
    let errors: Vec<Value> = endpoint
        .errors
        .iter()
        .map(|e| json!({ "code": e.code, "name": e.name, "description": e.description }))
        .collect();

    json!({
        "post": {
            "operationId": endpoint.name,
            "summary": endpoint.description,
            "tags": [endpoint.category],
            "x-operation-selector": endpoint.dispatch_key,
            "x-declared-errors": errors,
            "requestBody": {
                "required": true,
                "content": {
                    "application/json": {
                        "schema": request_schema(endpoint, wire_version),
                        "example": example,
                    }
                }
            },
            "responses": {
                "200": {
                    "description": "Envelope; `Result` 200 carries the payload, any other code an error string",
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "object",
                                "required": ["Result", "Response"],
                                "properties": {
                                    "Result": { "type": "integer" },
                                    "Response": {
                                        "oneOf": [schema_ref(&endpoint.response), { "type": "string" }]
                                    }
                                }
                            },
                            "example": endpoint.example_response,
                        }
                    }
                }
            }
        }
    })
}

/// The OpenAPI document of `registries`.
pub fn build_document(
    registries: &Registries,
    schema_version: &str,
    description: &str,
    schema_hash: &str,
) -> Value {
    let schemas: Map<String, Value> =
        registries.types.iter().map(|def| (def.name.clone(), type_schema(def))).collect();
    let paths: Map<String, Value> = registries
        .endpoints
        .iter()
        .map(|e| (format!("/operations/{}", e.name), operation(e, registries.wire_version())))
        .collect();

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Circular Protocol Wallet API",
            "version": schema_version,
            "description": description,
            "x-wire-version": registries.wire_version(),
            "x-schema-hash": schema_hash,
        },
        "servers": [{ "url": DEFAULT_NAG_URL }],
        "paths": paths,
        "components": { "schemas": schemas },
    })
}

/// Render the document artifact of the context's snapshot.
pub fn openapi_artifact(ctx: &GenerationContext) -> Result<GeneratedArtifact, serde_json::Error> {
    let document = build_document(
        ctx.registries(),
        ctx.snapshot().schema_version(),
        ctx.snapshot().description(),
        ctx.schema_hash(),
    );
    let content = serde_json::to_string_pretty(&document)?;
    Ok(GeneratedArtifact::new(ArtifactKind::OpenapiDoc, None, OPENAPI_PATH, content, ctx.schema_hash()))
}

#[cfg(test)]
mod tests {
    use schema::FieldDef;

    use super::*;

    #[test]
    fn test_composite_contracts_flatten() {
        let def = TypeDefinition {
            name: "Address".into(),
            description: "Wallet address".into(),
            kind: TypeKind::CompositeContract {
                base: ScalarType::String,
                contracts: vec![
                    Contract::NonEmpty,
                    Contract::All {
                        contracts: vec![
                            Contract::Regex { pattern: "^[0-9a-f]+$".into() },
                            Contract::LengthIn { min: 64, max: 66 },
                        ],
                    },
                ],
            },
        };
        assert_eq!(
            type_schema(&def),
            json!({
                "type": "string",
                "minLength": 64,
                "maxLength": 66,
                "pattern": "^[0-9a-f]+$",
                "description": "Wallet address",
            })
        );
    }

    #[test]
    fn test_records_are_closed_by_default() {
        let def = TypeDefinition {
            name: "WalletExistence".into(),
            description: String::new(),
            kind: TypeKind::Record {
                fields: vec![FieldDef {
                    name: "exists".into(),
                    type_ref: "Boolean".into(),
                    required: true,
                    description: String::new(),
                }],
                additional_fields: false,
            },
        };
        let schema = type_schema(&def);
        assert_eq!(schema["additionalProperties"], json!(false));
        assert_eq!(schema["required"], json!(["exists"]));
        assert_eq!(schema["properties"]["exists"]["$ref"], json!("#/components/schemas/Boolean"));
    }
}
