//! Go renderer

use std::collections::BTreeSet;
use std::fmt::{self, Write};

use types::TargetLanguage;

use super::{
    declared_errors, example_texts, field_ident, fill, indent, provenance, quote, summary,
    SdkRenderer,
};
use crate::model::{ClientModel, MethodModel, MethodSource, ParamModel};

const TEMPLATE: &str = include_str!("../../templates/go/client.go.tmpl");

/// Imports the template itself uses.
const BASE_IMPORTS: [&str; 6] =
    ["\"bytes\"", "\"encoding/json\"", "\"fmt\"", "\"io\"", "\"net/http\"", "\"time\""];

/// Renders the Go client.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoRenderer;

fn return_clause(method: &MethodModel) -> String {
    let fallible = method.is_endpoint() || method.is_fallible_helper();
    match (method.returns.as_deref(), fallible) {
        (Some(t), true) => format!(" ({}, error)", t),
        (None, true) => " error".to_string(),
        (Some(t), false) => format!(" {}", t),
        (None, false) => String::new(),
    }
}

fn signature(class_name: &str, method: &MethodModel) -> String {
    let args: Vec<String> =
        method.ordered_params().iter().map(|p| format!("{} {}", p.ident, p.type_token)).collect();
    format!(
        "func (c *{}) {}({}){} {{",
        class_name,
        method.ident,
        args.join(", "),
        return_clause(method)
    )
}

fn write_doc(buf: &mut String, method: &MethodModel) -> fmt::Result {
    let mut lines = summary(method).lines().map(str::to_string).collect::<Vec<_>>().into_iter();
    writeln!(buf, "// {} {}", method.ident, lines.next().unwrap_or_default())?;
    for line in lines {
        writeln!(buf, "// {}", line)?;
    }
    if let Some((request, response)) = example_texts(method) {
        writeln!(buf, "//")?;
        writeln!(buf, "// Example request:")?;
        writeln!(buf, "//")?;
        writeln!(buf, "//\t{}", request)?;
        writeln!(buf, "//")?;
        writeln!(buf, "// Example response:")?;
        writeln!(buf, "//")?;
        writeln!(buf, "//\t{}", response)?;
        let errors = declared_errors(method);
        if !errors.is_empty() {
            writeln!(buf, "//")?;
            writeln!(buf, "// Declared errors: {}.", errors.join(", "))?;
        }
    }
    Ok(())
}

/// Emit the payload assignment of one argument, `value` being its plain value.
fn write_argument(
    buf: &mut String,
    p: &ParamModel,
    value: &str,
    zero: &str,
    pad: &str,
) -> fmt::Result {
    let key = quote(&p.wire_name);
    match &p.normalize {
        Some(n) if n.fallible => {
            writeln!(buf, "{}_{}, _err := c.{}({})", pad, p.ident, n.method, value)?;
            writeln!(buf, "{}if _err != nil {{", pad)?;
            writeln!(buf, "{}\treturn {}, _err", pad, zero)?;
            writeln!(buf, "{}}}", pad)?;
            writeln!(buf, "{}_payload[{}] = _{}", pad, key, p.ident)
        }
        Some(n) => writeln!(buf, "{}_payload[{}] = c.{}({})", pad, key, n.method, value),
        None => writeln!(buf, "{}_payload[{}] = {}", pad, key, value),
    }
}

fn write_endpoint(buf: &mut String, method: &MethodModel) -> fmt::Result {
    let MethodSource::Endpoint { dispatch_key, errors, .. } = &method.source else {
        return Ok(());
    };
    let out = method.returns.as_deref().unwrap_or("interface{}");
    let zero = format!("*new({})", out);
    writeln!(buf, "\t_payload := map[string]interface{{}}{{}}")?;
    for p in &method.params {
        if p.required {
            write_argument(buf, p, &p.ident, &zero, "\t")?;
        } else {
            writeln!(buf, "\tif {} != nil {{", p.ident)?;
            write_argument(buf, p, &format!("*{}", p.ident), &zero, "\t\t")?;
            writeln!(buf, "\t}}")?;
        }
    }
    let errors: Vec<String> = errors.iter().map(|e| format!("{}: {}", e.code, quote(&e.name))).collect();
    writeln!(
        buf,
        "\treturn invoke[{}](c, {}, _payload, map[int64]string{{{}}})",
        out,
        quote(dispatch_key),
        errors.join(", ")
    )
}

fn write_method(buf: &mut String, class_name: &str, method: &MethodModel) -> fmt::Result {
    writeln!(buf)?;
    write_doc(buf, method)?;
    writeln!(buf, "{}", signature(class_name, method))?;
    match &method.source {
        MethodSource::Endpoint { .. } => write_endpoint(buf, method)?,
        MethodSource::Helper { body, .. } => writeln!(buf, "{}", indent(body, "\t"))?,
    }
    writeln!(buf, "}}")
}

impl SdkRenderer for GoRenderer {
    fn target(&self) -> TargetLanguage { TargetLanguage::Go }

    fn internal_members(&self) -> &'static [&'static str] { &["fail", "invoke", "transport", "envelope"] }

    fn render(&self, model: &ClientModel) -> Result<String, fmt::Error> {
        let mut fields = String::new();
        let mut inits = String::new();
        for f in &model.fields {
            writeln!(fields, "\t{} {}", f.ident, f.type_token)?;
            writeln!(inits, "\t\t{}: {},", f.ident, quote(&f.initial))?;
        }
        let mut methods = String::new();
        for method in &model.methods {
            write_method(&mut methods, &model.class_name, method)?;
        }

        let imports: BTreeSet<&str> = BASE_IMPORTS
            .iter()
            .copied()
            .chain(model.imports.iter().map(String::as_str))
            .collect();
        let imports: Vec<String> = imports.iter().map(|i| format!("\t{}", i)).collect();
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
                ("FIELD_INITS", inits.trim_end()),
                ("METHODS", methods.trim_end()),
            ],
        ))
    }
}
