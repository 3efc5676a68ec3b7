use types::*;

#[test]
fn test_every_target_has_a_complete_profile() {
    for target in TargetLanguage::ALL {
        let profile = target.profile();
        for key in [TypeKey::String, TypeKey::Integer, TypeKey::Number, TypeKey::Boolean, TypeKey::Any, TypeKey::Record] {
            assert!(!profile.types.token(key).is_empty(), "{} lacks a token for {:?}", target, key);
        }
        assert!(!profile.leading_prefix.is_empty());
        assert!(profile.acronym("ID").is_some());
        assert_eq!(profile.naming.style(IdentifierKind::Class), CaseStyle::Pascal);
    }
}

#[test]
fn test_method_case_styles_follow_language_conventions() {
    assert_eq!(TargetLanguage::Python.profile().naming.method, CaseStyle::Snake);
    assert_eq!(TargetLanguage::TypeScript.profile().naming.method, CaseStyle::Camel);
    assert_eq!(TargetLanguage::Go.profile().naming.method, CaseStyle::Pascal);
    assert_eq!(TargetLanguage::Java.profile().naming.method, CaseStyle::Camel);
}

#[test]
fn test_reserved_words() {
    assert!(TargetLanguage::Python.profile().is_reserved("from"));
    assert!(TargetLanguage::Go.profile().is_reserved("type"));
    assert!(TargetLanguage::Java.profile().is_reserved("class"));
    assert!(!TargetLanguage::TypeScript.profile().is_reserved("address"));
}

#[test]
fn test_surface_patterns_compile() {
    for target in TargetLanguage::ALL {
        assert!(regex::Regex::new(target.surface_pattern()).is_ok(), "{}", target);
    }
}

#[test]
fn test_schema_version_from_wire_version() {
    let v: SchemaVersion = "2.0.0-alpha.1".parse().expect("parse");
    assert_eq!(v.as_str(), "2.0.0-alpha.1");
    assert_eq!(v.major, 2);
}
