mod common;

use analysis::{analyze, validate_snapshot, AnalysisError};
use common::{canonical, edited, endpoint};
use schema::{Contract, ScalarType, SchemaError, TypeDefinition, TypeKind};
use serde_json::json;

#[test]
fn test_canonical_schema_validates() {
    let registries = validate_snapshot(&canonical()).expect("canonical schema is valid");
    assert_eq!(registries.endpoints.len(), 24);
    assert_eq!(registries.helpers.len(), 14);
    assert!(registries.types.contains("WalletExistence"));
}

#[test]
fn test_duplicates_are_reported_together() {
    let base = canonical();
    let snapshot = edited(&base, "1.0.0", |types, endpoints, _| {
        types.push(types[0].clone());
        endpoints.push(endpoints[0].clone());
    });
    let errors = validate_snapshot(&snapshot).expect_err("duplicates");
    let kinds: Vec<&str> = errors
        .iter()
        .filter_map(|e| match e {
            SchemaError::Duplicate { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect();
    assert!(kinds.contains(&"type"), "{:?}", errors);
    assert!(kinds.contains(&"endpoint"), "{:?}", errors);
    assert!(kinds.contains(&"dispatch key"), "{:?}", errors);
}

#[test]
fn test_unresolved_param_type() {
    let base = canonical();
    let snapshot = edited(&base, "1.0.0", |_, endpoints, _| {
        endpoint(endpoints, "checkWallet").params[0].type_ref = "ChainName".into();
    });
    let errors = validate_snapshot(&snapshot).expect_err("unresolved");
    assert!(errors.iter().any(|e| matches!(
        e,
        SchemaError::UnresolvedType { type_name, .. } if type_name == "ChainName"
    )));
}

#[test]
fn test_example_must_satisfy_its_contracts() {
    let base = canonical();
    let snapshot = edited(&base, "1.0.0", |_, endpoints, _| {
        endpoint(endpoints, "checkWallet").example_request["Address"] = json!("not-hex");
    });
    let errors = validate_snapshot(&snapshot).expect_err("violation");
    match &errors[..] {
        [SchemaError::ExampleViolation { location, violation }] => {
            assert!(location.contains("checkWallet"));
            assert_eq!(violation.field_path, "$.Address");
        }
        other => panic!("unexpected errors: {:?}", other),
    }
}

#[test]
fn test_example_response_must_be_a_success_envelope() {
    let base = canonical();
    let snapshot = edited(&base, "1.0.0", |_, endpoints, _| {
        endpoint(endpoints, "checkWallet").example_response = json!({"Result": 400, "Response": "bad"});
    });
    let errors = validate_snapshot(&snapshot).expect_err("not a success");
    assert!(errors.iter().any(|e| matches!(e, SchemaError::Malformed { .. })));
}

#[test]
fn test_unknown_normalizer_and_reserved_param() {
    let base = canonical();
    let snapshot = edited(&base, "1.0.0", |_, endpoints, _| {
        let wallet = endpoint(endpoints, "checkWallet");
        wallet.params[1].normalize = Some("toLower".into());
        wallet.params[0].name = "Version".into();
    });
    let errors = validate_snapshot(&snapshot).expect_err("malformed");
    let text: Vec<String> = errors.iter().map(ToString::to_string).collect();
    assert!(text.iter().any(|t| t.contains("toLower")), "{:?}", text);
    assert!(text.iter().any(|t| t.contains("reserved")), "{:?}", text);
}

#[test]
fn test_contract_must_fit_its_base() {
    let base = canonical();
    let snapshot = edited(&base, "1.0.0", |types, _, _| {
        types.push(TypeDefinition {
            name: "Weird".into(),
            description: String::new(),
            kind: TypeKind::CompositeContract {
                base: ScalarType::Boolean,
                contracts: vec![Contract::Regex { pattern: "(".into() }],
            },
        });
    });
    let errors = validate_snapshot(&snapshot).expect_err("malformed");
    assert_eq!(errors.len(), 2, "{:?}", errors);
}

#[test]
fn test_indirect_list_cycle_is_malformed() {
    let base = canonical();
    let list = |name: &str, item: &str| TypeDefinition {
        name: name.into(),
        description: String::new(),
        kind: TypeKind::List { item: item.into() },
    };
    let snapshot = edited(&base, "1.0.0", |types, _, _| {
        types.push(list("Ring", "RingItems"));
        types.push(list("RingItems", "Ring"));
        types.push(list("Nested", "Nested"));
        types.push(list("Leaf", "RingItems"));
    });
    let errors = validate_snapshot(&snapshot).expect_err("cyclic lists");
    let reasons: Vec<String> = errors
        .iter()
        .filter_map(|e| match e {
            SchemaError::Malformed { location, reason } => Some(format!("{}: {}", location, reason)),
            _ => None,
        })
        .collect();
    assert!(reasons.contains(&"type Ring: list nests itself: Ring -> RingItems -> Ring".to_string()), "{:?}", reasons);
    assert!(reasons.contains(&"type RingItems: list nests itself: RingItems -> Ring -> RingItems".to_string()));
    assert!(reasons.contains(&"type Nested: list nests itself: Nested -> Nested".to_string()));
    // Leads into a cycle without being part of it.
    assert!(!reasons.iter().any(|r| r.starts_with("type Leaf")), "{:?}", reasons);
}

#[test]
fn test_helper_case_arity() {
    let base = canonical();
    let snapshot = edited(&base, "1.0.0", |_, _, helpers| {
        let pad = helpers.iter_mut().find(|h| h.name == "padNumber").expect("padNumber");
        pad.test_cases[0].inputs.push(json!(1));
    });
    let errors = validate_snapshot(&snapshot).expect_err("arity");
    assert!(errors[0].to_string().contains("padNumber"));
}

#[test]
fn test_analyze_without_baseline() {
    let analysis = analyze(&canonical(), None, false).expect("valid");
    assert!(analysis.regression.is_none());

    let base = canonical();
    let broken = edited(&base, "1.0.0", |_, endpoints, _| {
        endpoint(endpoints, "checkWallet").response = "Nope".into();
    });
    assert!(matches!(analyze(&broken, None, false), Err(AnalysisError::Invalid(_))));
}
