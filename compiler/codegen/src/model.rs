//! The typed client model rendered by every target
//!
//! [`ClientModel::build`] resolves every identifier and type token of one
//! target through the naming layer before anything is formatted. Renderers
//! never name things themselves.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use naming::{map_name, MappingError, TypeMapper};
use regex::Regex;
use schema::{EndpointDefinition, HelperCategory, HelperDefinition, HelperTestCase, ParamDef};
use types::{IdentifierKind, TargetLanguage, TargetLanguageProfile};

use crate::context::GenerationContext;
use crate::error::GenerationError;
use crate::helpers;
use crate::targets::renderer_for;

/// Canonical name of the client class.
pub const CLIENT_CLASS: &str = "CircularProtocolClient";

/// Default network access gateway URL.
pub const DEFAULT_NAG_URL: &str = "https://nag.circularlabs.io/NAG.php?cep=";

/// Client state fields: canonical name and initial value.
const CLIENT_FIELDS: [(&str, &str); 3] =
    [("nagURL", DEFAULT_NAG_URL), ("nagKey", ""), ("lastError", "")];

/// A client state field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldModel {
    /// Canonical name
    pub canonical: String,
    /// Target identifier
    pub ident: String,
    /// Target type token
    pub type_token: String,
    /// Initial string value (unquoted)
    pub initial: String,
}

/// Normalization applied to an argument before it goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    /// Target identifier of the helper method
    pub method: String,
    /// Whether the helper can fail
    pub fallible: bool,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamModel {
    /// Canonical name, also the wire field name
    pub wire_name: String,
    /// Target identifier
    pub ident: String,
    /// Declared type token (optional form when not required)
    pub type_token: String,
    /// Type token of the value itself
    pub inner_token: String,
    /// Whether the argument must be supplied
    pub required: bool,
    /// Free-form description
    pub description: String,
    /// Helper applied before sending
    pub normalize: Option<Normalizer>,
}

/// A declared endpoint error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCase {
    /// `Result` code
    pub code: i64,
    /// Canonical error name
    pub name: String,
}

/// Where a method comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodSource {
    /// An API operation
    Endpoint {
        /// Operation selector
        dispatch_key: String,
        /// Catalog category
        category: String,
        /// Declared errors
        errors: Vec<ErrorCase>,
        /// Canonical request body
        example_request: serde_json::Value,
        /// Canonical response envelope text
        example_response: String,
    },
    /// A helper method
    Helper {
        /// Helper category
        category: HelperCategory,
        /// Body with every placeholder expanded
        body: String,
        /// Whether the body can fail
        fallible: bool,
        /// Table of expected results
        test_cases: Vec<HelperTestCase>,
    },
}

/// A public client method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodModel {
    /// Canonical name
    pub canonical: String,
    /// Target identifier
    pub ident: String,
    /// Free-form description
    pub description: String,
    /// Parameters in declaration order
    pub params: Vec<ParamModel>,
    /// Return type token; `None` for no value
    pub returns: Option<String>,
    /// Endpoint or helper
    pub source: MethodSource,
}

impl MethodModel {
    /// Parameters in call order: required first, then optional, each in
    /// declaration order.
    pub fn ordered_params(&self) -> Vec<&ParamModel> {
        let (required, optional): (Vec<_>, Vec<_>) = self.params.iter().partition(|p| p.required);
        required.into_iter().chain(optional).collect()
    }

    /// Whether this method calls the transport.
    pub fn is_endpoint(&self) -> bool { matches!(self.source, MethodSource::Endpoint { .. }) }

    /// Whether the method can fail outside the transport path.
    pub fn is_fallible_helper(&self) -> bool {
        matches!(self.source, MethodSource::Helper { fallible: true, .. })
    }
}

/// The client of one target.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientModel {
    /// Target the model is named for
    pub target: TargetLanguage,
    /// Client class identifier
    pub class_name: String,
    /// Schema version of the snapshot
    pub schema_version: String,
    /// Wire version sent with every request
    pub wire_version: String,
    /// Content hash of the snapshot
    pub schema_hash: String,
    /// State fields
    pub fields: Vec<FieldModel>,
    /// Endpoints in catalog order, then helpers in registry order
    pub methods: Vec<MethodModel>,
    /// Imports the helper bodies need
    pub imports: BTreeSet<String>,
}

fn placeholder_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{([pmf]):([A-Za-z0-9_]+)\}\}").ok()).as_ref()
}

fn mapping_error(target: TargetLanguage, subject: &str, e: MappingError) -> GenerationError {
    match e {
        MappingError::UnresolvedType(type_name) =>
            GenerationError::UnresolvedType { target, subject: subject.to_string(), type_name },
        MappingError::Cycle(type_name) =>
            GenerationError::CyclicType { target, subject: subject.to_string(), type_name },
    }
}

struct Builder<'a> {
    ctx: &'a GenerationContext,
    target: TargetLanguage,
    profile: &'a TargetLanguageProfile,
    mapper: TypeMapper<'a>,
    errors: Vec<GenerationError>,
}

impl<'a> Builder<'a> {
    fn ident(&self, canonical: &str, kind: IdentifierKind) -> String {
        map_name(canonical, kind, self.profile)
    }

    fn params(&mut self, subject: &str, defs: &[ParamDef]) -> Vec<ParamModel> {
        let mut params = Vec::with_capacity(defs.len());
        let mut seen: BTreeMap<String, String> = BTreeMap::new();
        for def in defs {
            let ident = self.ident(&def.name, IdentifierKind::Parameter);
            if let Some(other) = seen.insert(ident.clone(), def.name.clone()) {
                self.errors.push(GenerationError::NamingCollision {
                    target: self.target,
                    subject: subject.to_string(),
                    identifier: ident.clone(),
                    other: format!("parameter `{}`", other),
                });
            }

            let inner_token = match self.mapper.map_type_ref(&def.type_ref) {
                Ok(token) => token,
                Err(e) => {
                    self.errors.push(mapping_error(self.target, subject, e));
                    continue;
                }
            };
            let type_token = if def.required {
                inner_token.clone()
            } else {
                self.profile.types.optional(&inner_token)
            };
            let normalize = def.normalize.as_deref().and_then(|helper| self.normalizer(subject, helper));

            params.push(ParamModel {
                wire_name: def.name.clone(),
                ident,
                type_token,
                inner_token,
                required: def.required,
                description: def.description.clone(),
                normalize,
            });
        }
        params
    }

    fn normalizer(&mut self, subject: &str, helper: &str) -> Option<Normalizer> {
        let snippet = self
            .ctx
            .registries()
            .helpers
            .get(helper)
            .ok()
            .and_then(|def| helpers::resolve(def, self.target));
        match snippet {
            Some(snippet) => Some(Normalizer {
                method: self.ident(helper, IdentifierKind::Method),
                fallible: snippet.fallible,
            }),
            None => {
                self.errors.push(GenerationError::MissingHelper {
                    target: self.target,
                    subject: subject.to_string(),
                    helper: helper.to_string(),
                });
                None
            }
        }
    }

    fn returns(&mut self, subject: &str, type_name: Option<&str>) -> Option<String> {
        match self.mapper.map_return(type_name) {
            Ok(token) => token,
            Err(e) => {
                self.errors.push(mapping_error(self.target, subject, e));
                None
            }
        }
    }

    fn endpoint(&mut self, def: &EndpointDefinition) -> MethodModel {
        let params = self.params(&def.name, &def.params);
        let returns = self.returns(&def.name, Some(&def.response));
        MethodModel {
            canonical: def.name.clone(),
            ident: self.ident(&def.name, IdentifierKind::Method),
            description: def.description.clone(),
            params,
            returns,
            source: MethodSource::Endpoint {
                dispatch_key: def.dispatch_key.clone(),
                category: def.category.clone(),
                errors: def
                    .errors
                    .iter()
                    .map(|e| ErrorCase { code: e.code, name: e.name.clone() })
                    .collect(),
                example_request: def.example_request.clone(),
                example_response: def.response_text(),
            },
        }
    }

    fn helper(
        &mut self,
        def: &HelperDefinition,
        methods: &BTreeMap<String, String>,
        fields: &[FieldModel],
        imports: &mut BTreeSet<String>,
    ) -> MethodModel {
        let params = self.params(&def.name, &def.params);
        let returns = self.returns(&def.name, def.returns.as_deref());

        let (body, fallible) = match helpers::resolve(def, self.target) {
            Some(snippet) => {
                imports.extend(snippet.imports.iter().cloned());
                (self.expand(&def.name, &snippet.body, &params, methods, fields), snippet.fallible)
            }
            None => {
                self.errors.push(GenerationError::MissingHelper {
                    target: self.target,
                    subject: def.name.clone(),
                    helper: def.name.clone(),
                });
                (String::new(), false)
            }
        };

        MethodModel {
            canonical: def.name.clone(),
            ident: self.ident(&def.name, IdentifierKind::Method),
            description: def.description.clone(),
            params,
            returns,
            source: MethodSource::Helper {
                category: def.category,
                body,
                fallible,
                test_cases: def.test_cases.clone(),
            },
        }
    }

    /// Replace `{{p:..}}`, `{{m:..}}` and `{{f:..}}` with target identifiers.
    fn expand(
        &mut self,
        subject: &str,
        body: &str,
        params: &[ParamModel],
        methods: &BTreeMap<String, String>,
        fields: &[FieldModel],
    ) -> String {
        let Some(pattern) = placeholder_pattern() else {
            return body.to_string();
        };
        let mut out = String::with_capacity(body.len());
        let mut last = 0;
        for caps in pattern.captures_iter(body) {
            let (Some(whole), Some(kind), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            out.push_str(&body[last..whole.start()]);
            last = whole.end();

            let name = name.as_str();
            let resolved = match kind.as_str() {
                "p" => params.iter().find(|p| p.wire_name == name).map(|p| p.ident.clone()),
                "m" => methods.get(name).cloned(),
                _ => fields.iter().find(|f| f.canonical == name).map(|f| f.ident.clone()),
            };
            match resolved {
                Some(ident) => out.push_str(&ident),
                None => {
                    self.errors.push(if kind.as_str() == "m" {
                        GenerationError::MissingHelper {
                            target: self.target,
                            subject: subject.to_string(),
                            helper: name.to_string(),
                        }
                    } else {
                        GenerationError::UnknownPlaceholder {
                            target: self.target,
                            subject: subject.to_string(),
                            placeholder: whole.as_str().to_string(),
                        }
                    });
                    out.push_str(whole.as_str());
                }
            }
        }
        out.push_str(&body[last..]);
        out
    }

    fn check_members(&mut self, fields: &[FieldModel], methods: &[MethodModel]) {
        let mut taken: BTreeMap<String, String> = renderer_for(self.target)
            .internal_members()
            .iter()
            .map(|m| (m.to_string(), format!("internal member `{}`", m)))
            .collect();
        for field in fields {
            taken.insert(field.ident.clone(), format!("field `{}`", field.canonical));
        }
        for method in methods {
            if let Some(other) =
                taken.insert(method.ident.clone(), format!("method `{}`", method.canonical))
            {
                self.errors.push(GenerationError::NamingCollision {
                    target: self.target,
                    subject: method.canonical.clone(),
                    identifier: method.ident.clone(),
                    other,
                });
            }
        }
    }
}

impl ClientModel {
    /// Build the model of `target` from the context.
    ///
    /// All problems are collected; on any error the whole target fails.
    pub fn build(
        ctx: &GenerationContext,
        target: TargetLanguage,
    ) -> Result<Self, Vec<GenerationError>> {
        let profile = target.profile();
        let registries = ctx.registries();
        let mut builder = Builder {
            ctx,
            target,
            profile: &profile,
            mapper: TypeMapper::new(&registries.types, &profile),
            errors: Vec::new(),
        };

        let string_token = builder.mapper.map_scalar(schema::ScalarType::String).to_string();
        let fields: Vec<FieldModel> = CLIENT_FIELDS
            .iter()
            .map(|(canonical, initial)| FieldModel {
                canonical: canonical.to_string(),
                ident: builder.ident(canonical, IdentifierKind::Field),
                type_token: string_token.clone(),
                initial: initial.to_string(),
            })
            .collect();

        let method_idents: BTreeMap<String, String> = registries
            .endpoints
            .iter()
            .map(|e| e.name.as_str())
            .chain(registries.helpers.iter().map(|h| h.name.as_str()))
            .map(|name| (name.to_string(), builder.ident(name, IdentifierKind::Method)))
            .collect();

        let mut imports = BTreeSet::new();
        let mut methods = Vec::new();
        for endpoint in registries.endpoints.iter() {
            methods.push(builder.endpoint(endpoint));
        }
        for helper in registries.helpers.iter() {
            methods.push(builder.helper(helper, &method_idents, &fields, &mut imports));
        }
        builder.check_members(&fields, &methods);

        if !builder.errors.is_empty() {
            for e in &builder.errors {
                tracing::warn!(%target, error = %e, "generation error");
            }
            return Err(builder.errors);
        }

        Ok(ClientModel {
            target,
            class_name: map_name(CLIENT_CLASS, IdentifierKind::Class, &profile),
            schema_version: ctx.snapshot().schema_version().to_string(),
            wire_version: ctx.wire_version().to_string(),
            schema_hash: ctx.schema_hash().to_string(),
            fields,
            methods,
            imports,
        })
    }

    /// The field with canonical name `canonical`.
    pub fn field(&self, canonical: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|f| f.canonical == canonical)
    }

    /// The method with canonical name `canonical`.
    pub fn method(&self, canonical: &str) -> Option<&MethodModel> {
        self.methods.iter().find(|m| m.canonical == canonical)
    }

    /// Endpoint methods in catalog order.
    pub fn endpoints(&self) -> impl Iterator<Item = &MethodModel> {
        self.methods.iter().filter(|m| m.is_endpoint())
    }

    /// Helper methods in registry order.
    pub fn helpers(&self) -> impl Iterator<Item = &MethodModel> {
        self.methods.iter().filter(|m| !m.is_endpoint())
    }
}

#[cfg(test)]
mod tests {
    use schema::{ErrorDef, SchemaSnapshot};
    use serde_json::json;

    use super::*;

    fn param(name: &str, type_ref: &str, required: bool, normalize: Option<&str>) -> ParamDef {
        ParamDef {
            name: name.into(),
            type_ref: type_ref.into(),
            required,
            normalize: normalize.map(Into::into),
            description: String::new(),
        }
    }

    fn endpoint(name: &str, params: Vec<ParamDef>, response: &str) -> EndpointDefinition {
        EndpointDefinition {
            name: name.into(),
            category: "wallet".into(),
            dispatch_key: name.into(),
            description: format!("{} description", name),
            params,
            response: response.into(),
            errors: vec![ErrorDef { code: 404, name: "NotFound".into(), description: String::new() }],
            example_request: json!({"Version": "2.0.0-alpha.1"}),
            example_response: json!({"Result": 200, "Response": "ok"}),
        }
    }

    fn helper(name: &str, params: Vec<ParamDef>, overrides: &[(&str, &str)]) -> HelperDefinition {
        HelperDefinition {
            name: name.into(),
            category: HelperCategory::Encoding,
            description: String::new(),
            params,
            returns: Some("String".into()),
            implementations: overrides.iter().map(|(t, b)| (t.to_string(), b.to_string())).collect(),
            test_cases: vec![],
        }
    }

    fn context(endpoints: Vec<EndpointDefinition>, helpers: Vec<HelperDefinition>) -> GenerationContext {
        let snapshot =
            SchemaSnapshot::new("1.0.0", "2.0.0-alpha.1", vec![], endpoints, helpers);
        GenerationContext::new(snapshot).expect("context")
    }

    #[test]
    fn test_builds_methods_in_order() {
        let ctx = context(
            vec![endpoint(
                "getWalletBalance",
                vec![
                    param("Asset", "String", false, None),
                    param("Address", "String", true, Some("hexFix")),
                ],
                "Any",
            )],
            vec![helper("hexFix", vec![param("hex", "String", true, None)], &[])],
        );
        let model = ClientModel::build(&ctx, TargetLanguage::Python).expect("model");
        assert_eq!(model.class_name, "CircularProtocolClient");
        assert_eq!(model.methods.len(), 2);
        assert_eq!(model.methods[0].ident, "get_wallet_balance");
        assert_eq!(model.methods[1].ident, "hex_fix");

        let balance = &model.methods[0];
        let ordered: Vec<&str> = balance.ordered_params().iter().map(|p| p.ident.as_str()).collect();
        assert_eq!(ordered, ["address", "asset"]);
        assert_eq!(balance.params[0].type_token, "Optional[str]");
        assert_eq!(
            balance.params[1].normalize,
            Some(Normalizer { method: "hex_fix".into(), fallible: false })
        );
        assert_eq!(model.field("nagURL").map(|f| f.ident.as_str()), Some("nag_url"));
    }

    #[test]
    fn test_placeholders_are_expanded() {
        let ctx = context(
            vec![],
            vec![
                helper("hexFix", vec![param("hex", "String", true, None)], &[]),
                helper(
                    "wrap",
                    vec![param("Value", "String", true, None)],
                    &[("go", "return c.{{m:hexFix}}({{p:Value}}) + c.{{f:nagKey}}")],
                ),
            ],
        );
        let model = ClientModel::build(&ctx, TargetLanguage::Go).expect("model");
        let MethodSource::Helper { body, .. } = &model.methods[1].source else {
            panic!("helper expected");
        };
        assert_eq!(body, "return c.HexFix(value) + c.nagKey");
    }

    #[test]
    fn test_all_errors_are_reported() {
        let ctx = context(
            vec![
                endpoint("getWallet", vec![param("Address", "Walet", true, None)], "Any"),
                endpoint("getBlock", vec![param("Start", "Integer", true, Some("noSuch"))], "Missing"),
            ],
            vec![helper("mystery", vec![], &[])],
        );
        let errors = ClientModel::build(&ctx, TargetLanguage::Java).expect_err("errors");
        assert!(errors.contains(&GenerationError::UnresolvedType {
            target: TargetLanguage::Java,
            subject: "getWallet".into(),
            type_name: "Walet".into(),
        }));
        assert!(errors.contains(&GenerationError::MissingHelper {
            target: TargetLanguage::Java,
            subject: "getBlock".into(),
            helper: "noSuch".into(),
        }));
        assert!(errors.iter().any(|e| matches!(e, GenerationError::UnresolvedType { type_name, .. } if type_name == "Missing")));
        assert!(errors.iter().any(|e| matches!(e, GenerationError::MissingHelper { subject, .. } if subject == "mystery")));
        assert!(errors.iter().all(|e| e.target() == TargetLanguage::Java));
    }

    #[test]
    fn test_unknown_placeholder() {
        let ctx = context(
            vec![],
            vec![helper("odd", vec![], &[("typescript", "return {{p:nothing}};")])],
        );
        let errors = ClientModel::build(&ctx, TargetLanguage::TypeScript).expect_err("errors");
        assert_eq!(
            errors,
            vec![GenerationError::UnknownPlaceholder {
                target: TargetLanguage::TypeScript,
                subject: "odd".into(),
                placeholder: "{{p:nothing}}".into(),
            }]
        );
    }

    #[test]
    fn test_naming_collisions() {
        let ctx = context(
            vec![
                endpoint("getNAGURL", vec![], "Any"),
                endpoint("pair", vec![param("a_b", "String", true, None), param("aB", "String", true, None)], "Any"),
            ],
            vec![helper("get_nag_url", vec![], &[("python", "return self.{{f:nagURL}}")])],
        );
        let errors = ClientModel::build(&ctx, TargetLanguage::Python).expect_err("collision");
        assert!(errors.iter().any(|e| matches!(
            e,
            GenerationError::NamingCollision { subject, identifier, .. }
                if subject == "get_nag_url" && identifier == "get_nag_url"
        )));
        assert!(errors.iter().any(|e| matches!(
            e,
            GenerationError::NamingCollision { subject, identifier, .. }
                if subject == "pair" && identifier == "a_b"
        )));
    }
}
