//! Per-target test suites and parity drivers
//!
//! A suite carries tier 2 (one unit test per helper test case) and tier 3
//! (one integration test per endpoint, run against the mock). Test names
//! start with the target's tier prefix so one suite file serves both tiers.

mod go;
mod java;
mod python;
mod typescript;

use std::fmt;

use codegen::{ClientModel, MethodModel, MethodSource, ParamModel};
use serde_json::Value;
use types::{SuiteFilter, TargetLanguage};

pub use go::GoSuite;
pub use java::JavaSuite;
pub use python::PythonSuite;
pub use typescript::TypeScriptSuite;

/// Formats the test suite and the parity driver of one target.
pub trait SuiteRenderer: Send + Sync {
    /// Target the suite exercises.
    fn target(&self) -> TargetLanguage;

    /// Render the unit and integration suite.
    fn render_suite(&self, model: &ClientModel) -> Result<String, fmt::Error>;

    /// Render the parity driver.
    fn render_driver(&self, model: &ClientModel) -> Result<String, fmt::Error>;
}

static PYTHON: PythonSuite = PythonSuite;
static TYPESCRIPT: TypeScriptSuite = TypeScriptSuite;
static GO: GoSuite = GoSuite;
static JAVA: JavaSuite = JavaSuite;

/// The suite renderer registered for `target`.
pub fn suite_renderer_for(target: TargetLanguage) -> &'static dyn SuiteRenderer {
    match target {
        TargetLanguage::Python => &PYTHON,
        TargetLanguage::TypeScript => &TYPESCRIPT,
        TargetLanguage::Go => &GO,
        TargetLanguage::Java => &JAVA,
    }
}

/// One argument of a generated call; `None` leaves an optional parameter out.
pub(crate) struct Argument<'a> {
    pub param: &'a ParamModel,
    pub value: Option<&'a Value>,
}

/// A helper test case.
pub(crate) struct HelperCase<'a> {
    pub method: &'a MethodModel,
    pub index: usize,
    pub args: Vec<Argument<'a>>,
    pub expected: &'a Value,
}

/// An endpoint exercised with its canonical example.
pub(crate) struct EndpointCase<'a> {
    pub method: &'a MethodModel,
    pub args: Vec<Argument<'a>>,
    /// `Response` of the example envelope, as JSON text
    pub payload: String,
    /// Top-level fields of the payload; empty when it is not a record
    pub fields: Vec<String>,
}

/// Helper test cases of the model, arguments in call order.
pub(crate) fn helper_cases(model: &ClientModel) -> Vec<HelperCase<'_>> {
    let mut cases = Vec::new();
    for method in model.helpers() {
        let MethodSource::Helper { test_cases, .. } = &method.source else { continue };
        for (index, case) in test_cases.iter().enumerate() {
            let args = method
                .ordered_params()
                .into_iter()
                .map(|param| {
                    let position = method.params.iter().position(|p| p.wire_name == param.wire_name);
                    Argument { param, value: position.and_then(|i| case.inputs.get(i)) }
                })
                .collect();
            cases.push(HelperCase { method, index, args, expected: &case.expected });
        }
    }
    cases
}

/// Endpoints of the model with their example arguments in call order.
pub(crate) fn endpoint_cases(model: &ClientModel) -> Vec<EndpointCase<'_>> {
    model
        .endpoints()
        .filter_map(|method| {
            let MethodSource::Endpoint { example_request, example_response, .. } = &method.source
            else {
                return None;
            };
            let args = method
                .ordered_params()
                .into_iter()
                .map(|param| Argument { param, value: example_request.get(&param.wire_name) })
                .collect();
            let payload = serde_json::from_str::<Value>(example_response)
                .ok()
                .and_then(|envelope| envelope.get("Response").cloned())
                .unwrap_or(Value::Null);
            let fields = match &payload {
                Value::Object(map) => map.keys().cloned().collect(),
                _ => Vec::new(),
            };
            Some(EndpointCase { method, args, payload: payload.to_string(), fields })
        })
        .collect()
}

/// Upper-case the first character.
pub(crate) fn capitalize(ident: &str) -> String {
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Name of the unit test of one helper case.
pub(crate) fn unit_test_name(target: TargetLanguage, ident: &str, index: usize) -> String {
    let prefix = target.test_prefix(SuiteFilter::Unit);
    match target {
        TargetLanguage::Python | TargetLanguage::TypeScript => format!("{}{}_{}", prefix, ident, index),
        TargetLanguage::Go | TargetLanguage::Java => format!("{}{}{}", prefix, capitalize(ident), index),
    }
}

/// Name of the integration test of one endpoint.
pub(crate) fn integration_test_name(target: TargetLanguage, ident: &str) -> String {
    let prefix = target.test_prefix(SuiteFilter::Integration);
    match target {
        TargetLanguage::Python | TargetLanguage::TypeScript => format!("{}{}", prefix, ident),
        TargetLanguage::Go | TargetLanguage::Java => format!("{}{}", prefix, capitalize(ident)),
    }
}

/// Header line of every suite and driver.
pub(crate) fn provenance(model: &ClientModel) -> String {
    format!(
        "Generated by orbit from schema {} ({}). Do not edit.",
        model.schema_version,
        model.schema_hash.get(..12).unwrap_or(&model.schema_hash)
    )
}

/// Module the suite imports the SDK from: the SDK file without its extension.
pub(crate) fn sdk_module(target: TargetLanguage) -> &'static str {
    let file = target.sdk_file();
    file.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file)
}
