//! Target language profiles
//!
//! A [`TargetLanguageProfile`] bundles everything the naming and type layers
//! need to know about one target: case style per identifier kind, the type
//! mapping table, acronyms, reserved words, the sanitization prefix and the
//! error convention of the generated client.

use serde::Serialize;

use crate::target::TargetLanguage;

/// Identifier case styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaseStyle {
    /// `snake_case`
    Snake,
    /// `camelCase`
    Camel,
    /// `PascalCase`
    Pascal,
    /// `SCREAMING_SNAKE_CASE`
    ScreamingSnake,
}

/// Kinds of identifiers the emitter asks names for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IdentifierKind {
    /// Client class / struct
    Class,
    /// Public method
    Method,
    /// Method parameter
    Parameter,
    /// Client state field
    Field,
    /// Constant
    Constant,
}

/// How acronyms are rendered inside camel and Pascal identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AcronymStyle {
    /// Keep acronyms upper case (`getNAGURL`)
    Preserve,
    /// Treat acronyms as ordinary words (`getNagUrl`)
    Capitalize,
}

/// How the generated client surfaces declared errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorConvention {
    /// Raise / throw an exception
    Exception,
    /// Return a typed error value alongside the result
    ErrorValue,
    /// Return a discriminated result type
    ResultType,
}

/// Keys of the type mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// `string` scalar (also enums and string composites)
    String,
    /// `integer` scalar
    Integer,
    /// `number` scalar
    Number,
    /// `boolean` scalar
    Boolean,
    /// `any` scalar
    Any,
    /// Record of fields
    Record,
}

/// Type kind to target type token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMappingTable {
    string: &'static str,
    integer: &'static str,
    number: &'static str,
    boolean: &'static str,
    any: &'static str,
    record: &'static str,
    list_template: &'static str,
    optional_template: &'static str,
}

impl TypeMappingTable {
    /// Token for a non-list kind.
    pub fn token(&self, key: TypeKey) -> &'static str {
        match key {
            TypeKey::String => self.string,
            TypeKey::Integer => self.integer,
            TypeKey::Number => self.number,
            TypeKey::Boolean => self.boolean,
            TypeKey::Any => self.any,
            TypeKey::Record => self.record,
        }
    }

    /// Token for a list of `item`.
    pub fn list_of(&self, item: &str) -> String { self.list_template.replace("{item}", item) }

    /// Token for an optional `inner` parameter.
    pub fn optional(&self, inner: &str) -> String {
        self.optional_template.replace("{inner}", inner)
    }
}

/// Case style per identifier kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NamingRules {
    /// Client class
    pub class: CaseStyle,
    /// Public methods
    pub method: CaseStyle,
    /// Parameters
    pub parameter: CaseStyle,
    /// State fields
    pub field: CaseStyle,
    /// Constants
    pub constant: CaseStyle,
}

impl NamingRules {
    /// Style for `kind`.
    pub fn style(&self, kind: IdentifierKind) -> CaseStyle {
        match kind {
            IdentifierKind::Class => self.class,
            IdentifierKind::Method => self.method,
            IdentifierKind::Parameter => self.parameter,
            IdentifierKind::Field => self.field,
            IdentifierKind::Constant => self.constant,
        }
    }
}

/// Everything needed to name and type one target's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetLanguageProfile {
    /// The target
    pub target: TargetLanguage,
    /// Case style per identifier kind
    pub naming: NamingRules,
    /// Kind to type token
    pub types: TypeMappingTable,
    /// Atomic upper-case tokens (`ID`, `URL`, `NAG`, ...)
    pub acronyms: &'static [&'static str],
    /// Rendering of acronyms inside camel / Pascal identifiers
    pub acronym_style: AcronymStyle,
    /// Words that cannot be used as identifiers
    pub reserved_words: &'static [&'static str],
    /// Prefix for identifiers that would start with a digit
    pub leading_prefix: &'static str,
    /// Error convention of the generated client
    pub error_convention: ErrorConvention,
}

impl TargetLanguageProfile {
    /// Whether `word` is reserved in this target.
    pub fn is_reserved(&self, word: &str) -> bool { self.reserved_words.contains(&word) }

    /// The acronym matching `token` case-insensitively, if any.
    pub fn acronym(&self, token: &str) -> Option<&'static str> {
        self.acronyms.iter().copied().find(|a| a.eq_ignore_ascii_case(token))
    }
}

const ACRONYMS: &[&str] = &["API", "HTTP", "JSON", "NAG", "URL", "ID"];

const PYTHON_RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in",
    "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with",
    "yield", "self",
];

const TYPESCRIPT_RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import", "in",
    "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "let", "static", "yield", "await", "implements",
    "interface", "package", "private", "protected", "public",
];

const GO_RESERVED: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for",
    "func", "go", "goto", "if", "import", "interface", "map", "package", "range", "return",
    "select", "struct", "switch", "type", "var", "c",
];

const JAVA_RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long", "native",
    "new", "package", "private", "protected", "public", "return", "short", "static", "strictfp",
    "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try", "void",
    "volatile", "while", "true", "false", "null", "var", "record", "yield",
];

impl TargetLanguage {
    /// The profile of this target.
    pub fn profile(&self) -> TargetLanguageProfile {
        match self {
            TargetLanguage::Python => TargetLanguageProfile {
                target: *self,
                naming: NamingRules {
                    class: CaseStyle::Pascal,
                    method: CaseStyle::Snake,
                    parameter: CaseStyle::Snake,
                    field: CaseStyle::Snake,
                    constant: CaseStyle::ScreamingSnake,
                },
                types: TypeMappingTable {
                    string: "str",
                    integer: "int",
                    number: "float",
                    boolean: "bool",
                    any: "Any",
                    record: "Dict[str, Any]",
                    list_template: "List[{item}]",
                    optional_template: "Optional[{inner}]",
                },
                acronyms: ACRONYMS,
                acronym_style: AcronymStyle::Preserve,
                reserved_words: PYTHON_RESERVED,
                leading_prefix: "n",
                error_convention: ErrorConvention::Exception,
            },
            TargetLanguage::TypeScript => TargetLanguageProfile {
                target: *self,
                naming: NamingRules {
                    class: CaseStyle::Pascal,
                    method: CaseStyle::Camel,
                    parameter: CaseStyle::Camel,
                    field: CaseStyle::Camel,
                    constant: CaseStyle::ScreamingSnake,
                },
                types: TypeMappingTable {
                    string: "string",
                    integer: "number",
                    number: "number",
                    boolean: "boolean",
                    any: "unknown",
                    record: "Record<string, unknown>",
                    list_template: "{item}[]",
                    optional_template: "{inner} | undefined",
                },
                acronyms: ACRONYMS,
                acronym_style: AcronymStyle::Preserve,
                reserved_words: TYPESCRIPT_RESERVED,
                leading_prefix: "n",
                error_convention: ErrorConvention::ResultType,
            },
            TargetLanguage::Go => TargetLanguageProfile {
                target: *self,
                naming: NamingRules {
                    class: CaseStyle::Pascal,
                    method: CaseStyle::Pascal,
                    parameter: CaseStyle::Camel,
                    field: CaseStyle::Camel,
                    constant: CaseStyle::Pascal,
                },
                types: TypeMappingTable {
                    string: "string",
                    integer: "int64",
                    number: "float64",
                    boolean: "bool",
                    any: "interface{}",
                    record: "map[string]interface{}",
                    list_template: "[]{item}",
                    optional_template: "*{inner}",
                },
                acronyms: ACRONYMS,
                acronym_style: AcronymStyle::Preserve,
                reserved_words: GO_RESERVED,
                leading_prefix: "N",
                error_convention: ErrorConvention::ErrorValue,
            },
            TargetLanguage::Java => TargetLanguageProfile {
                target: *self,
                naming: NamingRules {
                    class: CaseStyle::Pascal,
                    method: CaseStyle::Camel,
                    parameter: CaseStyle::Camel,
                    field: CaseStyle::Camel,
                    constant: CaseStyle::ScreamingSnake,
                },
                types: TypeMappingTable {
                    string: "String",
                    integer: "Long",
                    number: "Double",
                    boolean: "Boolean",
                    any: "Object",
                    record: "Map<String, Object>",
                    list_template: "List<{item}>",
                    optional_template: "{inner}",
                },
                acronyms: ACRONYMS,
                acronym_style: AcronymStyle::Capitalize,
                reserved_words: JAVA_RESERVED,
                leading_prefix: "n",
                error_convention: ErrorConvention::Exception,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_carry_their_target() {
        for target in TargetLanguage::ALL {
            assert_eq!(target.profile().target, target);
        }
    }

    #[test]
    fn test_type_tables() {
        let py = TargetLanguage::Python.profile();
        assert_eq!(py.types.list_of("str"), "List[str]");
        assert_eq!(py.types.optional("int"), "Optional[int]");

        let go = TargetLanguage::Go.profile();
        assert_eq!(go.types.token(TypeKey::Record), "map[string]interface{}");
        assert_eq!(go.types.list_of(go.types.token(TypeKey::Record)), "[]map[string]interface{}");
    }

    #[test]
    fn test_error_conventions() {
        assert_eq!(TargetLanguage::Python.profile().error_convention, ErrorConvention::Exception);
        assert_eq!(TargetLanguage::TypeScript.profile().error_convention, ErrorConvention::ResultType);
        assert_eq!(TargetLanguage::Go.profile().error_convention, ErrorConvention::ErrorValue);
        assert_eq!(TargetLanguage::Java.profile().error_convention, ErrorConvention::Exception);
    }

    #[test]
    fn test_acronym_lookup_is_case_insensitive() {
        let ts = TargetLanguage::TypeScript.profile();
        assert_eq!(ts.acronym("Url"), Some("URL"));
        assert_eq!(ts.acronym("nag"), Some("NAG"));
        assert_eq!(ts.acronym("Key"), None);
    }
}
