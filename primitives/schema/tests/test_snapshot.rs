use std::path::PathBuf;

use schema::{HelperCategory, ScalarType, SchemaSnapshot, TypeKind};
use tempfile::TempDir;

fn canonical_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../resources/schema/circular-wallet.json")
}

fn canonical() -> SchemaSnapshot {
    SchemaSnapshot::from_file(canonical_path()).expect("canonical snapshot loads")
}

#[test]
fn test_canonical_snapshot_shape() {
    let snapshot = canonical();

    assert_eq!(snapshot.schema_version(), "1.0.0");
    assert_eq!(snapshot.wire_version(), "2.0.0-alpha.1");
    assert_eq!(snapshot.endpoints().len(), 24);
    assert_eq!(snapshot.helpers().len(), 14);

    let hex_fix = snapshot.helpers().iter().find(|h| h.name == "hexFix").expect("hexFix");
    assert_eq!(hex_fix.category, HelperCategory::Encoding);
    assert_eq!(hex_fix.test_cases.len(), 2);
    assert_eq!(hex_fix.test_cases[0].inputs, vec![serde_json::json!("0x1234")]);
    assert_eq!(hex_fix.test_cases[0].expected, serde_json::json!("1234"));
}

#[test]
fn test_check_wallet_example_pair() {
    let snapshot = canonical();
    let check = snapshot.endpoints().iter().find(|e| e.name == "checkWallet").expect("checkWallet");

    assert_eq!(check.dispatch_key, "checkWallet");
    assert_eq!(check.response_text(), r#"{"Response":{"exists":true},"Result":200}"#);
    assert_eq!(check.example_request["Address"], format!("0x{}", "b".repeat(64)));
    assert_eq!(check.example_request["Blockchain"], "MainNet");
    assert_eq!(check.example_request["Version"], "2.0.0-alpha.1");
    assert_eq!(check.param("Address").and_then(|p| p.normalize.as_deref()), Some("hexFix"));
}

#[test]
fn test_type_kinds_parse_from_tagged_form() {
    let snapshot = canonical();
    let block_number = snapshot.types().iter().find(|t| t.name == "BlockNumber").expect("type");
    match &block_number.kind {
        TypeKind::CompositeContract { base, contracts } => {
            assert_eq!(*base, ScalarType::Integer);
            assert_eq!(contracts.len(), 1);
        }
        other => panic!("unexpected kind {:?}", other),
    }

    let list = snapshot.types().iter().find(|t| t.name == "BlockchainList").expect("type");
    assert_eq!(list.kind, TypeKind::List { item: "BlockchainInfo".to_string() });
}

#[test]
fn test_file_roundtrip_preserves_hash() {
    let snapshot = canonical();
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("snapshot.json");

    snapshot.to_file(&path).expect("write");
    let reloaded = SchemaSnapshot::from_file(&path).expect("read");

    assert_eq!(reloaded, snapshot);
    assert_eq!(
        reloaded.content_hash().expect("hash"),
        snapshot.content_hash().expect("hash")
    );
}

#[test]
fn test_freeze_shares_one_value() {
    let frozen = canonical().freeze().expect("freeze");
    let clone = frozen.clone();

    assert_eq!(frozen.hash().len(), 64);
    assert_eq!(frozen.short_hash().len(), 12);
    assert!(std::sync::Arc::ptr_eq(&frozen.shared(), &clone.shared()));
    assert_eq!(clone.endpoints().len(), 24);
}

#[test]
fn test_hash_tracks_content() {
    let a = canonical();
    let b = canonical().with_schema_version("1.0.1");
    assert_ne!(a.content_hash().expect("hash"), b.content_hash().expect("hash"));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = SchemaSnapshot::from_file("/nonexistent/orbit/schema.json").expect_err("missing");
    assert!(matches!(err, schema::SchemaError::Io { .. }));
}

#[test]
fn test_malformed_json_is_parse_error() {
    let err = SchemaSnapshot::from_json_str("{\"schema_version\": 1}").expect_err("bad");
    assert!(matches!(err, schema::SchemaError::Parse(_)));
}
