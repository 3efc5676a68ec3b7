use std::path::PathBuf;

use registry::{EndpointCatalog, Registries, RegistryError};
use schema::{SchemaError, SchemaSnapshot, Value};
use serde_json::json;

fn canonical() -> SchemaSnapshot {
    let path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../resources/schema/circular-wallet.json");
    SchemaSnapshot::from_file(path).expect("canonical snapshot loads")
}

#[test]
fn test_canonical_examples_satisfy_their_schemas() {
    let snapshot = canonical();
    let registries = Registries::from_snapshot(&snapshot).expect("registries");

    for endpoint in registries.endpoints.iter() {
        let request = Value::from(&endpoint.example_request);
        registries
            .types
            .validate_request(endpoint, &request, registries.wire_version())
            .unwrap_or_else(|v| panic!("{} example_request: {}", endpoint.name, v));

        let response = Value::from(&endpoint.example_response);
        registries
            .types
            .validate_response(endpoint, &response)
            .unwrap_or_else(|v| panic!("{} example_response: {}", endpoint.name, v));
    }
}

#[test]
fn test_scenario_a_request_violations() {
    let registries = Registries::from_snapshot(&canonical()).expect("registries");
    let check = registries.endpoints.get("checkWallet").expect("checkWallet");

    let short = Value::from(json!({"Address": "0xbb", "Blockchain": "MainNet", "Version": "2.0.0-alpha.1"}));
    let err = registries.types.validate_request(check, &short, "2.0.0-alpha.1").expect_err("short");
    assert_eq!(err.field_path, "$.Address");

    let stale = Value::from(json!({
        "Address": format!("0x{}", "b".repeat(64)),
        "Blockchain": "MainNet",
        "Version": "1.0.8"
    }));
    let err = registries.types.validate_request(check, &stale, "2.0.0-alpha.1").expect_err("version");
    assert_eq!(err.field_path, "$.Version");

    let missing = Value::from(json!({"Blockchain": "MainNet", "Version": "2.0.0-alpha.1"}));
    let err = registries.types.validate_request(check, &missing, "2.0.0-alpha.1").expect_err("missing");
    assert_eq!(err.actual, "missing");
}

#[test]
fn test_error_envelope_carries_a_string() {
    let registries = Registries::from_snapshot(&canonical()).expect("registries");
    let check = registries.endpoints.get("checkWallet").expect("checkWallet");

    let ok = Value::from(json!({"Result": 404, "Response": "Wallet not found"}));
    assert!(registries.types.validate_response(check, &ok).is_ok());

    let bad = Value::from(json!({"Result": 404, "Response": {"exists": false}}));
    let err = registries.types.validate_response(check, &bad).expect_err("not a string");
    assert_eq!(err.field_path, "$.Response");
}

#[test]
fn test_catalog_list_by_category_keeps_order() {
    let registries = Registries::from_snapshot(&canonical()).expect("registries");
    let catalog = &registries.endpoints;

    assert_eq!(catalog.len(), 24);
    assert_eq!(
        catalog.categories(),
        vec!["wallet", "transaction", "block", "contract", "asset", "domain", "network"]
    );

    let wallet: Vec<&str> = catalog.list(Some("wallet")).iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        wallet,
        vec!["checkWallet", "getWallet", "getLatestTransactions", "getWalletBalance", "getWalletNonce", "registerWallet"]
    );
    assert!(catalog.list(Some("mining")).is_empty());
    assert_eq!(catalog.list(None).first().map(|e| e.name.as_str()), Some("checkWallet"));
}

#[test]
fn test_catalog_get_not_found() {
    let registries = Registries::from_snapshot(&canonical()).expect("registries");
    let err = registries.endpoints.get("getMiningInfo").expect_err("absent");
    assert_eq!(err, RegistryError::NotFound { kind: "endpoint", name: "getMiningInfo".to_string() });
    assert!(registries.endpoints.by_dispatch_key("getBlockCount").is_some());
    assert!(registries.helpers.get("hexFix").is_ok());
    assert!(registries.helpers.get("hexUnfix").is_err());
}

#[test]
fn test_duplicate_dispatch_key_is_a_schema_error() {
    let snapshot = canonical();
    let mut endpoints = snapshot.endpoints().to_vec();
    let mut clone = endpoints[0].clone();
    clone.name = "checkWalletAgain".to_string();
    endpoints.push(clone);

    let err = EndpointCatalog::from_definitions(&endpoints).expect_err("duplicate");
    assert_eq!(err, SchemaError::Duplicate { kind: "dispatch key", name: "checkWallet".to_string() });
}
