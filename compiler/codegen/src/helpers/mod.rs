//! Helper emitters
//!
//! Each target registers one [`HelperEmitter`] carrying its built-in helper
//! bodies. A body is target source with placeholders that the model expands
//! through the naming layer:
//!
//! - `{{p:name}}` the identifier of the helper's parameter `name`
//! - `{{m:name}}` the identifier of the client method `name`
//! - `{{f:name}}` the identifier of the client field `name`
//!
//! A per-snapshot override in the helper definition wins over the built-in.

mod go;
mod java;
mod python;
mod typescript;

use schema::HelperDefinition;
use types::TargetLanguage;

pub use go::GoHelpers;
pub use java::JavaHelpers;
pub use python::PythonHelpers;
pub use typescript::TypeScriptHelpers;

/// Source of one helper method body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HelperSnippet {
    /// Method body, unindented, with placeholders
    pub body: String,
    /// Imports the body needs, in target syntax
    pub imports: Vec<String>,
    /// Whether the body can fail (Go returns an extra `error`)
    pub fallible: bool,
}

impl HelperSnippet {
    /// A snippet without imports.
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into(), imports: Vec::new(), fallible: false }
    }

    /// Add imports.
    pub fn with_imports(mut self, imports: &[&str]) -> Self {
        self.imports.extend(imports.iter().map(|i| i.to_string()));
        self
    }

    /// Mark the body as fallible.
    pub fn fallible(mut self) -> Self {
        self.fallible = true;
        self
    }
}

/// Built-in helper bodies of one target.
pub trait HelperEmitter: Send + Sync {
    /// Target the bodies are written in.
    fn target(&self) -> TargetLanguage;

    /// Built-in body of the helper named `helper`, if there is one.
    fn builtin(&self, helper: &str) -> Option<HelperSnippet>;
}

static PYTHON: PythonHelpers = PythonHelpers;
static TYPESCRIPT: TypeScriptHelpers = TypeScriptHelpers;
static GO: GoHelpers = GoHelpers;
static JAVA: JavaHelpers = JavaHelpers;

/// The emitter registered for `target`.
pub fn emitter_for(target: TargetLanguage) -> &'static dyn HelperEmitter {
    match target {
        TargetLanguage::Python => &PYTHON,
        TargetLanguage::TypeScript => &TYPESCRIPT,
        TargetLanguage::Go => &GO,
        TargetLanguage::Java => &JAVA,
    }
}

/// Effective body of `helper` for `target`: the snapshot override if present,
/// otherwise the built-in.
pub fn resolve(helper: &HelperDefinition, target: TargetLanguage) -> Option<HelperSnippet> {
    match helper.override_for(target.as_str()) {
        Some(body) => Some(HelperSnippet::new(body)),
        None => emitter_for(target).builtin(&helper.name),
    }
}

#[cfg(test)]
mod tests {
    use schema::HelperCategory;

    use super::*;

    const CANONICAL_HELPERS: [&str; 14] = [
        "setNAGURL",
        "getNAGURL",
        "setNAGKey",
        "getNAGKey",
        "getFormattedTimestamp",
        "stringToHex",
        "hexToString",
        "hexFix",
        "padNumber",
        "hashString",
        "getPublicKey",
        "signMessage",
        "verifySignature",
        "getError",
    ];

    #[test]
    fn test_every_target_implements_every_helper() {
        for target in TargetLanguage::ALL {
            let emitter = emitter_for(target);
            assert_eq!(emitter.target(), target);
            for helper in CANONICAL_HELPERS {
                assert!(emitter.builtin(helper).is_some(), "{} lacks {}", target, helper);
            }
            assert!(emitter.builtin("noSuchHelper").is_none());
        }
    }

    #[test]
    fn test_override_wins() {
        let mut helper = HelperDefinition {
            name: "hexFix".into(),
            category: HelperCategory::Encoding,
            description: String::new(),
            params: vec![],
            returns: Some("String".into()),
            implementations: Default::default(),
            test_cases: vec![],
        };
        let builtin = resolve(&helper, TargetLanguage::Go).expect("builtin");
        assert!(builtin.body.contains("strings.HasPrefix"));

        helper.implementations.insert("go".into(), "return {{p:hex}}".into());
        let overridden = resolve(&helper, TargetLanguage::Go).expect("override");
        assert_eq!(overridden.body, "return {{p:hex}}");
        assert!(overridden.imports.is_empty());
    }
}
