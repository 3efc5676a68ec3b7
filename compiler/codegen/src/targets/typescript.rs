//! TypeScript renderer

use std::fmt::{self, Write};

use types::TargetLanguage;

use super::{
    block_comment_safe, declared_errors, example_texts, field_ident, fill, indent, provenance,
    quote, summary, SdkRenderer,
};
use crate::model::{ClientModel, MethodModel, MethodSource, ParamModel};

const TEMPLATE: &str = include_str!("../../templates/typescript/client.ts.tmpl");

/// Renders the TypeScript client.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptRenderer;

fn signature(method: &MethodModel) -> String {
    let args: Vec<String> = method
        .ordered_params()
        .iter()
        .map(|p| {
            if p.required {
                format!("{}: {}", p.ident, p.inner_token)
            } else {
                format!("{}?: {}", p.ident, p.inner_token)
            }
        })
        .collect();
    let returns = method.returns.as_deref().unwrap_or("void");
    if method.is_endpoint() {
        format!("  async {}({}): Promise<Result<{}>> {{", method.ident, args.join(", "), returns)
    } else {
        format!("  {}({}): {} {{", method.ident, args.join(", "), returns)
    }
}

fn write_doc(buf: &mut String, method: &MethodModel) -> fmt::Result {
    writeln!(buf, "  /**")?;
    writeln!(buf, "   * {}", block_comment_safe(&summary(method)))?;
    for p in method.ordered_params() {
        if !p.description.is_empty() {
            writeln!(buf, "   * @param {} {}", p.ident, block_comment_safe(&p.description))?;
        }
    }
    if let Some((request, response)) = example_texts(method) {
        writeln!(buf, "   *")?;
        writeln!(buf, "   * Example request: `{}`", block_comment_safe(&request))?;
        writeln!(buf, "   * Example response: `{}`", block_comment_safe(response))?;
        let errors = declared_errors(method);
        if !errors.is_empty() {
            writeln!(buf, "   *")?;
            writeln!(buf, "   * Declared errors: {}", errors.join(", "))?;
        }
    }
    writeln!(buf, "   */")
}

fn argument(p: &ParamModel) -> String {
    match &p.normalize {
        Some(n) => format!("this.{}({})", n.method, p.ident),
        None => p.ident.clone(),
    }
}

fn write_endpoint(buf: &mut String, method: &MethodModel) -> fmt::Result {
    let MethodSource::Endpoint { dispatch_key, errors, .. } = &method.source else {
        return Ok(());
    };
    writeln!(buf, "    const _payload: Record<string, unknown> = {{}};")?;
    for p in &method.params {
        let key = quote(&p.wire_name);
        if p.required {
            writeln!(buf, "    _payload[{}] = {};", key, argument(p))?;
        } else {
            writeln!(buf, "    if ({} !== undefined) {{", p.ident)?;
            writeln!(buf, "      _payload[{}] = {};", key, argument(p))?;
            writeln!(buf, "    }}")?;
        }
    }
    let errors: Vec<String> = errors.iter().map(|e| format!("{}: {}", e.code, quote(&e.name))).collect();
    let errors = if errors.is_empty() { "{}".to_string() } else { format!("{{ {} }}", errors.join(", ")) };
    writeln!(
        buf,
        "    return this.invoke<{}>({}, _payload, {});",
        method.returns.as_deref().unwrap_or("unknown"),
        quote(dispatch_key),
        errors
    )
}

fn write_method(buf: &mut String, method: &MethodModel) -> fmt::Result {
    writeln!(buf)?;
    write_doc(buf, method)?;
    writeln!(buf, "{}", signature(method))?;
    match &method.source {
        MethodSource::Endpoint { .. } => write_endpoint(buf, method)?,
        MethodSource::Helper { body, .. } => writeln!(buf, "{}", indent(body, "    "))?,
    }
    writeln!(buf, "  }}")
}

impl SdkRenderer for TypeScriptRenderer {
    fn target(&self) -> TargetLanguage { TargetLanguage::TypeScript }

    fn internal_members(&self) -> &'static [&'static str] { &["invoke", "transport"] }

    fn render(&self, model: &ClientModel) -> Result<String, fmt::Error> {
        let mut fields = String::new();
        for f in &model.fields {
            writeln!(fields, "  private {}: {} = {};", f.ident, f.type_token, quote(&f.initial))?;
        }
        let mut methods = String::new();
        for method in &model.methods {
            write_method(&mut methods, method)?;
        }

        let imports: Vec<&str> = model.imports.iter().map(String::as_str).collect();
        let mut imports = imports.join("\n");
        if !imports.is_empty() {
            imports.push('\n');
        }
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
