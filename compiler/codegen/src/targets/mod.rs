//! SDK renderers
//!
//! A renderer formats a [`ClientModel`] into one source unit. It does not
//! name anything: identifiers and type tokens come from the model, and the
//! fixed parts of each client (transport, envelope handling, error type)
//! come from a template under `templates/<target>/`.

mod go;
mod java;
mod python;
mod typescript;

use std::fmt;

use types::TargetLanguage;

pub use go::GoRenderer;
pub use java::JavaRenderer;
pub use python::PythonRenderer;
pub use typescript::TypeScriptRenderer;

use crate::model::{ClientModel, MethodModel, MethodSource};

/// Formats a client model as target source.
pub trait SdkRenderer: Send + Sync {
    /// Target the renderer writes.
    fn target(&self) -> TargetLanguage;

    /// Identifiers the template itself defines on the client.
    ///
    /// A method or field mapping to one of these is a naming collision.
    fn internal_members(&self) -> &'static [&'static str];

    /// Render the SDK source unit.
    fn render(&self, model: &ClientModel) -> Result<String, fmt::Error>;
}

static PYTHON: PythonRenderer = PythonRenderer;
static TYPESCRIPT: TypeScriptRenderer = TypeScriptRenderer;
static GO: GoRenderer = GoRenderer;
static JAVA: JavaRenderer = JavaRenderer;

/// The renderer registered for `target`.
pub fn renderer_for(target: TargetLanguage) -> &'static dyn SdkRenderer {
    match target {
        TargetLanguage::Python => &PYTHON,
        TargetLanguage::TypeScript => &TYPESCRIPT,
        TargetLanguage::Go => &GO,
        TargetLanguage::Java => &JAVA,
    }
}

/// A double-quoted string literal valid in all four targets.
pub(crate) fn quote(s: &str) -> String { serde_json::Value::String(s.to_string()).to_string() }

/// Prefix every non-empty line of `text` with `prefix`.
pub(crate) fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| if line.trim().is_empty() { String::new() } else { format!("{}{}", prefix, line) })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace every `{{KEY}}` of `template`.
pub(crate) fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{{{}}}}}", key), value)
    })
}

/// Text safe inside a `/* ... */` block comment.
pub(crate) fn block_comment_safe(text: &str) -> String {
    text.replace("*/", "*\\/").replace("\\u", "\\\\u")
}

/// Summary line of a method, never empty.
pub(crate) fn summary(method: &MethodModel) -> String {
    let text = method.description.trim();
    if text.is_empty() {
        method.canonical.clone()
    } else {
        text.to_string()
    }
}

/// Compact request JSON and response text of an endpoint example.
pub(crate) fn example_texts(method: &MethodModel) -> Option<(String, &str)> {
    match &method.source {
        MethodSource::Endpoint { example_request, example_response, .. } =>
            Some((example_request.to_string(), example_response.as_str())),
        MethodSource::Helper { .. } => None,
    }
}

/// Declared errors as `Name (code)` items.
pub(crate) fn declared_errors(method: &MethodModel) -> Vec<String> {
    match &method.source {
        MethodSource::Endpoint { errors, .. } =>
            errors.iter().map(|e| format!("{} ({})", e.name, e.code)).collect(),
        MethodSource::Helper { .. } => Vec::new(),
    }
}

/// Identifier of the client field `canonical`.
pub(crate) fn field_ident(model: &ClientModel, canonical: &str) -> String {
    model.field(canonical).map(|f| f.ident.clone()).unwrap_or_else(|| canonical.to_string())
}

/// File header line shared by every target.
pub(crate) fn provenance(model: &ClientModel) -> String {
    format!(
        "Generated by orbit from schema {} ({}). Do not edit.",
        model.schema_version,
        model.schema_hash.get(..12).unwrap_or(&model.schema_hash)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b\\c\n"), r#""a\"b\\c\n""#);
        assert_eq!(quote("https://nag.circularlabs.io/NAG.php?cep="), "\"https://nag.circularlabs.io/NAG.php?cep=\"");
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent("a\n\n  b", "    "), "    a\n\n      b");
    }

    #[test]
    fn test_fill_replaces_all_occurrences() {
        assert_eq!(fill("{{A}}-{{B}}-{{A}}", &[("A", "x"), ("B", "y")]), "x-y-x");
    }

    #[test]
    fn test_block_comment_safe() {
        assert_eq!(block_comment_safe("a */ b"), "a *\\/ b");
    }

    #[test]
    fn test_registered_renderers_match_targets() {
        for target in TargetLanguage::ALL {
            assert_eq!(renderer_for(target).target(), target);
            assert!(!renderer_for(target).internal_members().is_empty());
        }
    }
}
