//! Java renderer

use std::collections::BTreeSet;
use std::fmt::{self, Write};

use types::TargetLanguage;

use super::{
    block_comment_safe, declared_errors, example_texts, field_ident, fill, indent, provenance,
    quote, summary, SdkRenderer,
};
use crate::model::{ClientModel, MethodModel, MethodSource, ParamModel};

const TEMPLATE: &str = include_str!("../../templates/java/client.java.tmpl");

/// Imports the template itself uses.
const BASE_IMPORTS: [&str; 11] = [
    "import com.fasterxml.jackson.core.type.TypeReference;",
    "import com.fasterxml.jackson.databind.JsonNode;",
    "import com.fasterxml.jackson.databind.ObjectMapper;",
    "import com.fasterxml.jackson.databind.node.ObjectNode;",
    "import java.net.URI;",
    "import java.net.http.HttpClient;",
    "import java.net.http.HttpRequest;",
    "import java.net.http.HttpResponse;",
    "import java.time.Duration;",
    "import java.util.List;",
    "import java.util.Map;",
];

/// Renders the Java client.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaRenderer;

fn signature(method: &MethodModel) -> String {
    let args: Vec<String> =
        method.ordered_params().iter().map(|p| format!("{} {}", p.type_token, p.ident)).collect();
    format!(
        "    public {} {}({}) {{",
        method.returns.as_deref().unwrap_or("void"),
        method.ident,
        args.join(", ")
    )
}

fn write_doc(buf: &mut String, method: &MethodModel) -> fmt::Result {
    writeln!(buf, "    /**")?;
    for line in summary(method).lines() {
        writeln!(buf, "     * {}", block_comment_safe(line))?;
    }
    if let Some((request, response)) = example_texts(method) {
        writeln!(buf, "     *")?;
        writeln!(buf, "     * <p>Example request: <code>{}</code>", block_comment_safe(&request))?;
        writeln!(buf, "     *")?;
        writeln!(buf, "     * <p>Example response: <code>{}</code>", block_comment_safe(response))?;
    }
    for p in method.ordered_params() {
        if !p.description.is_empty() {
            writeln!(buf, "     * @param {} {}", p.ident, block_comment_safe(&p.description))?;
        }
    }
    let errors = declared_errors(method);
    if !errors.is_empty() {
        writeln!(buf, "     * @throws CircularException {}", errors.join(", "))?;
    }
    writeln!(buf, "     */")
}

fn argument(p: &ParamModel) -> String {
    match &p.normalize {
        Some(n) => format!("{}({})", n.method, p.ident),
        None => p.ident.clone(),
    }
}

fn write_endpoint(buf: &mut String, method: &MethodModel) -> fmt::Result {
    let MethodSource::Endpoint { dispatch_key, errors, .. } = &method.source else {
        return Ok(());
    };
    writeln!(buf, "        ObjectNode _payload = MAPPER.createObjectNode();")?;
    for p in &method.params {
        let key = quote(&p.wire_name);
        if p.required {
            writeln!(buf, "        _payload.putPOJO({}, {});", key, argument(p))?;
        } else {
            writeln!(buf, "        if ({} != null) {{", p.ident)?;
            writeln!(buf, "            _payload.putPOJO({}, {});", key, argument(p))?;
            writeln!(buf, "        }}")?;
        }
    }
    let errors: Vec<String> = errors.iter().map(|e| format!("{}L, {}", e.code, quote(&e.name))).collect();
    let returns = method.returns.as_deref().unwrap_or("Object");
    writeln!(
        buf,
        "        return invoke({}, _payload, Map.of({}), new TypeReference<{}>() {{}});",
        quote(dispatch_key),
        errors.join(", "),
        returns
    )
}

fn write_method(buf: &mut String, method: &MethodModel) -> fmt::Result {
    writeln!(buf)?;
    write_doc(buf, method)?;
    writeln!(buf, "{}", signature(method))?;
    match &method.source {
        MethodSource::Endpoint { .. } => write_endpoint(buf, method)?,
        MethodSource::Helper { body, .. } => writeln!(buf, "{}", indent(body, "        "))?,
    }
    writeln!(buf, "    }}")
}

impl SdkRenderer for JavaRenderer {
    fn target(&self) -> TargetLanguage { TargetLanguage::Java }

    fn internal_members(&self) -> &'static [&'static str] { &["invoke", "transport", "MAPPER"] }

    fn render(&self, model: &ClientModel) -> Result<String, fmt::Error> {
        let mut fields = String::new();
        for f in &model.fields {
            writeln!(fields, "    private {} {} = {};", f.type_token, f.ident, quote(&f.initial))?;
        }
        let mut methods = String::new();
        for method in &model.methods {
            write_method(&mut methods, method)?;
        }

        let imports: BTreeSet<&str> = BASE_IMPORTS
            .iter()
            .copied()
            .chain(model.imports.iter().map(String::as_str))
            .collect();
        let imports = imports.into_iter().collect::<Vec<_>>().join("\n");
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
