//! Python renderer

use std::fmt::{self, Write};

use types::TargetLanguage;

use super::{
    declared_errors, example_texts, field_ident, fill, indent, provenance, quote, summary,
    SdkRenderer,
};
use crate::model::{ClientModel, MethodModel, MethodSource, ParamModel};

const TEMPLATE: &str = include_str!("../../templates/python/client.py.tmpl");

/// Renders the Python client.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonRenderer;

fn docstring_safe(text: &str) -> String { text.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"") }

fn signature(method: &MethodModel) -> String {
    let mut args = vec!["self".to_string()];
    for p in method.ordered_params() {
        if p.required {
            args.push(format!("{}: {}", p.ident, p.type_token));
        } else {
            args.push(format!("{}: {} = None", p.ident, p.type_token));
        }
    }
    format!(
        "    def {}({}) -> {}:",
        method.ident,
        args.join(", "),
        method.returns.as_deref().unwrap_or("None")
    )
}

fn write_docstring(buf: &mut String, method: &MethodModel) -> fmt::Result {
    writeln!(buf, "        \"\"\"{}", docstring_safe(&summary(method)))?;
    if let Some((request, response)) = example_texts(method) {
        writeln!(buf)?;
        writeln!(buf, "        Example request::")?;
        writeln!(buf)?;
        writeln!(buf, "            {}", docstring_safe(&request))?;
        writeln!(buf)?;
        writeln!(buf, "        Example response::")?;
        writeln!(buf)?;
        writeln!(buf, "            {}", docstring_safe(response))?;
        let errors = declared_errors(method);
        if !errors.is_empty() {
            writeln!(buf)?;
            writeln!(buf, "        Raises:")?;
            writeln!(buf, "            CircularError: {}", errors.join(", "))?;
        }
    }
    writeln!(buf, "        \"\"\"")
}

fn argument(p: &ParamModel) -> String {
    match &p.normalize {
        Some(n) => format!("self.{}({})", n.method, p.ident),
        None => p.ident.clone(),
    }
}

fn write_endpoint(buf: &mut String, method: &MethodModel) -> fmt::Result {
    let MethodSource::Endpoint { dispatch_key, errors, .. } = &method.source else {
        return Ok(());
    };
    writeln!(buf, "        _payload: Dict[str, Any] = {{}}")?;
    for p in &method.params {
        let key = quote(&p.wire_name);
        if p.required {
            writeln!(buf, "        _payload[{}] = {}", key, argument(p))?;
        } else {
            writeln!(buf, "        if {} is not None:", p.ident)?;
            writeln!(buf, "            _payload[{}] = {}", key, argument(p))?;
        }
    }
    let errors: Vec<String> = errors.iter().map(|e| format!("{}: {}", e.code, quote(&e.name))).collect();
    writeln!(
        buf,
        "        return self._invoke({}, _payload, {{{}}})",
        quote(dispatch_key),
        errors.join(", ")
    )
}

fn write_method(buf: &mut String, method: &MethodModel) -> fmt::Result {
    writeln!(buf)?;
    writeln!(buf, "{}", signature(method))?;
    write_docstring(buf, method)?;
    match &method.source {
        MethodSource::Endpoint { .. } => write_endpoint(buf, method),
        MethodSource::Helper { body, .. } => writeln!(buf, "{}", indent(body, "        ")),
    }
}

impl SdkRenderer for PythonRenderer {
    fn target(&self) -> TargetLanguage { TargetLanguage::Python }

    fn internal_members(&self) -> &'static [&'static str] { &["_invoke", "_transport"] }

    fn render(&self, model: &ClientModel) -> Result<String, fmt::Error> {
        let mut fields = String::new();
        for f in &model.fields {
            writeln!(fields, "        self.{}: {} = {}", f.ident, f.type_token, quote(&f.initial))?;
        }
        let mut methods = String::new();
        for method in &model.methods {
            write_method(&mut methods, method)?;
        }

        let imports: Vec<&str> = model.imports.iter().map(String::as_str).collect();
        let imports = imports.join("\n");
        let header = provenance(model);
        let wire_version = quote(&model.wire_version);
        let nag_url = field_ident(model, "nagURL");
        let last_error = field_ident(model, "lastError");

        Ok(fill(
            TEMPLATE,
            &[
                ("PROVENANCE", header.as_str()),
                ("IMPORTS", imports.as_str()),
                ("WIRE_VERSION", wire_version.as_str()),
                ("CLASS_NAME", model.class_name.as_str()),
                ("NAG_URL", nag_url.as_str()),
                ("LAST_ERROR", last_error.as_str()),
                ("FIELDS", fields.trim_end()),
                ("METHODS", methods.trim_end()),
            ],
        ))
    }
}
