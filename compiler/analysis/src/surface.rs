//! Surface audit and compatibility check (tier 4a)
//!
//! The public surface of a rendered SDK is extracted with the target's
//! surface pattern. Names are compared after normalization, so `checkWallet`,
//! `check_wallet` and `CheckWallet` are the same method.

use std::collections::{BTreeMap, BTreeSet};

use codegen::GenerationError;
use naming::{map_name, tokenize};
use regex::Regex;
use registry::Registries;
use serde::Serialize;
use types::{IdentifierKind, TargetLanguage};

/// A public method found in rendered source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurfaceMethod {
    /// Identifier as written
    pub name: String,
    /// Parameter count, receiver excluded
    pub params: usize,
}

/// Lower-case snake form of `name` under the target's acronyms.
pub fn normalize_name(target: TargetLanguage, name: &str) -> String {
    let profile = target.profile();
    tokenize(name, profile.acronyms).iter().map(|t| t.to_ascii_lowercase()).collect::<Vec<_>>().join("_")
}

fn count_params(target: TargetLanguage, source: &str, open: usize) -> usize {
    let mut depth = 1usize;
    let mut commas = 0usize;
    let mut text = String::new();
    for c in source[open..].chars() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            ',' if depth == 1 => commas += 1,
            _ => {}
        }
        text.push(c);
    }
    let first = text.split(',').next().unwrap_or("").trim();
    if text.trim().is_empty() {
        return 0;
    }
    let count = commas + 1;
    if target == TargetLanguage::Python && (first == "self" || first.starts_with("self:")) {
        count - 1
    } else {
        count
    }
}

/// Public methods of `source` in order of appearance.
pub fn extract_surface(target: TargetLanguage, source: &str) -> Result<Vec<SurfaceMethod>, regex::Error> {
    let pattern = Regex::new(target.surface_pattern())?;
    Ok(pattern
        .captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().to_string();
            let params = count_params(target, source, whole.end());
            Some(SurfaceMethod { name, params })
        })
        .collect())
}

/// Canonical method names of the registries with their parameter counts.
fn canonical_surface(registries: &Registries) -> Vec<(&str, usize)> {
    registries
        .endpoints
        .iter()
        .map(|e| (e.name.as_str(), e.params.len()))
        .chain(registries.helpers.iter().map(|h| (h.name.as_str(), h.params.len())))
        .collect()
}

fn expected_key(target: TargetLanguage, canonical: &str) -> String {
    normalize_name(target, &map_name(canonical, IdentifierKind::Method, &target.profile()))
}

/// Check every rendered SDK exposes every endpoint and helper.
///
/// Yields one [`GenerationError::MissingMethod`] per target and absent
/// method. A source the surface pattern cannot be compiled for counts as
/// exposing nothing.
pub fn audit_surface(rendered: &[(TargetLanguage, &str)], registries: &Registries) -> Vec<GenerationError> {
    let mut errors = Vec::new();
    for (target, source) in rendered {
        let found: BTreeSet<String> = match extract_surface(*target, source) {
            Ok(methods) => methods.iter().map(|m| normalize_name(*target, &m.name)).collect(),
            Err(e) => {
                tracing::error!(target = %target, error = %e, "surface pattern does not compile");
                BTreeSet::new()
            }
        };
        for (canonical, _) in canonical_surface(registries) {
            if !found.contains(&expected_key(*target, canonical)) {
                errors.push(GenerationError::MissingMethod { target: *target, subject: canonical.to_string() });
            }
        }
    }
    if errors.is_empty() {
        tracing::debug!(targets = rendered.len(), "surface audit passed");
    } else {
        tracing::warn!(missing = errors.len(), "surface audit failed");
    }
    errors
}

/// A method whose parameter count differs from its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamMismatch {
    /// Canonical name
    pub method: String,
    /// Declared parameter count
    pub expected: usize,
    /// Count found in source
    pub found: usize,
}

/// Result of comparing one SDK source with the registries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompatibilityReport {
    /// Canonical names absent from the source
    pub missing: Vec<String>,
    /// Source methods with no canonical counterpart
    pub extra: Vec<String>,
    /// Methods present with the wrong arity
    pub param_mismatches: Vec<ParamMismatch>,
}

impl CompatibilityReport {
    /// Whether the source matches the registries exactly.
    pub fn is_compatible(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty() && self.param_mismatches.is_empty()
    }
}

/// Compare the surface of an SDK source, generated or hand-written, with the registries.
pub fn check_compatibility(
    target: TargetLanguage,
    source: &str,
    registries: &Registries,
) -> Result<CompatibilityReport, regex::Error> {
    let mut found: BTreeMap<String, SurfaceMethod> = BTreeMap::new();
    for method in extract_surface(target, source)? {
        found.entry(normalize_name(target, &method.name)).or_insert(method);
    }

    let mut report = CompatibilityReport::default();
    let mut matched = BTreeSet::new();
    for (canonical, declared) in canonical_surface(registries) {
        let key = expected_key(target, canonical);
        match found.get(&key) {
            Some(method) => {
                if method.params != declared {
                    report.param_mismatches.push(ParamMismatch {
                        method: canonical.to_string(),
                        expected: declared,
                        found: method.params,
                    });
                }
                matched.insert(key);
            }
            None => report.missing.push(canonical.to_string()),
        }
    }
    report.extra = found
        .into_iter()
        .filter(|(key, _)| !matched.contains(key))
        .map(|(_, method)| method.name)
        .collect();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_across_cases() {
        assert_eq!(normalize_name(TargetLanguage::Go, "CheckWallet"), "check_wallet");
        assert_eq!(normalize_name(TargetLanguage::Python, "check_wallet"), "check_wallet");
        assert_eq!(normalize_name(TargetLanguage::TypeScript, "checkWallet"), "check_wallet");
    }

    #[test]
    fn test_python_receiver_is_not_counted() {
        let source = "class C:\n    def check_wallet(self, blockchain: str, address: str) -> Any:\n        pass\n    def reset(self) -> None:\n        pass\n";
        let surface = extract_surface(TargetLanguage::Python, source).expect("pattern");
        assert_eq!(
            surface,
            vec![
                SurfaceMethod { name: "check_wallet".into(), params: 2 },
                SurfaceMethod { name: "reset".into(), params: 0 },
            ]
        );
    }

    #[test]
    fn test_generic_commas_do_not_split_params() {
        let source = "    public Result<Map<String, Object>> getAsset(String blockchain, Map<String, Object> extra) {\n";
        let surface = extract_surface(TargetLanguage::Java, source).expect("pattern");
        assert_eq!(surface[0].name, "getAsset");
        assert_eq!(surface[0].params, 2);
    }

    #[test]
    fn test_go_receiver_is_outside_the_match() {
        let source = "func (c *CircularProtocolClient) HexFix(word string) string {\n";
        let surface = extract_surface(TargetLanguage::Go, source).expect("pattern");
        assert_eq!(surface, vec![SurfaceMethod { name: "HexFix".into(), params: 1 }]);
    }
}
